use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

labeled_enum! {
    pub enum NotificationType {
        NewOrder => ("new_order", "Nuevo pedido"),
        OrderReady => ("order_ready", "Pedido listo"),
        ItemReady => ("item_ready", "Producto listo"),
        NewItem => ("new_item", "Nuevo producto para preparar"),
        CustomerRequest => ("customer_request", "Solicitud de cliente"),
        OrderServed => ("order_served", "Pedido servido"),
    }
    fallback = CustomerRequest;
}

labeled_enum! {
    pub enum NotificationPriority {
        Low => ("low", "Baja"),
        Medium => ("medium", "Media"),
        High => ("high", "Alta"),
        Urgent => ("urgent", "Urgente"),
    }
    fallback = Medium;
}

labeled_enum! {
    pub enum NotificationStatus {
        Pending => ("pending", "Pendiente"),
        Read => ("read", "Leída"),
        Responded => ("responded", "Atendida"),
    }
    fallback = Pending;
}

/// Alert addressed to a staff member.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StaffNotification {
    pub id: i32,
    pub tenant_id: i32,
    pub staff_id: Option<i32>,
    pub table_id: Option<i32>,
    pub order_id: Option<i32>,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub status: NotificationStatus,
    pub created_at: NaiveDateTime,
    pub read_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaffNotification {
    pub tenant_id: i32,
    pub staff_id: Option<i32>,
    pub table_id: Option<i32>,
    pub order_id: Option<i32>,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub created_at: NaiveDateTime,
}

impl NewStaffNotification {
    pub fn new(
        tenant_id: i32,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            tenant_id,
            staff_id: None,
            table_id: None,
            order_id: None,
            notification_type,
            title: title.into(),
            message: message.into(),
            priority: NotificationPriority::Medium,
            created_at,
        }
    }

    pub fn for_staff(mut self, staff_id: i32) -> Self {
        self.staff_id = Some(staff_id);
        self
    }

    pub fn with_table(mut self, table_id: Option<i32>) -> Self {
        self.table_id = table_id;
        self
    }

    pub fn with_order(mut self, order_id: i32) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Query definition used to list notifications.
#[derive(Debug, Clone)]
pub struct NotificationListQuery {
    pub tenant_id: i32,
    pub staff_id: Option<i32>,
    pub status: Option<NotificationStatus>,
    pub notification_type: Option<NotificationType>,
    pub pagination: Option<Pagination>,
}

impl NotificationListQuery {
    pub fn new(tenant_id: i32) -> Self {
        Self {
            tenant_id,
            staff_id: None,
            status: None,
            notification_type: None,
            pagination: None,
        }
    }

    pub fn staff(mut self, staff_id: i32) -> Self {
        self.staff_id = Some(staff_id);
        self
    }

    pub fn status(mut self, status: NotificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn notification_type(mut self, notification_type: NotificationType) -> Self {
        self.notification_type = Some(notification_type);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
