mod common;

#[test]
fn migrated_database_hands_out_connections() {
    let test_db = common::TestDb::new("connections.db");
    let conn = test_db.pool().get();
    assert!(conn.is_ok());
}
