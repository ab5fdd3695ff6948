mod common;

#[test]
fn test_db_files_are_removed_on_drop() {
    let base = "test_db_files_are_removed_on_drop.db";

    {
        let test_db = common::TestDb::new(base);
        let conn = test_db.pool().get();
        assert!(conn.is_ok());
    }

    for path in [base.to_string(), format!("{base}-shm"), format!("{base}-wal")] {
        assert!(!std::path::Path::new(&path).exists(), "{path} left behind");
    }
}
