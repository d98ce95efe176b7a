// ==========================================
// 持久化往返测试 (SQLite 文件库)
// ==========================================
// 测试范围:
// 1. save → load 得到相同状态（含顺序）
// 2. 引擎重启后继续编号
// 3. 移除零件后同步会删除旧行
// 4. 旧版数据库（无 seq 列、无在装箱）的兼容加载
// ==========================================


use parts_qc::config::config_keys;
use parts_qc::db::open_sqlite_connection;
use parts_qc::domain::state::StorageSystem;
use parts_qc::engine::storage::StorageEngine;
use parts_qc::repository::{SqliteStateRepository, StateStore};
use rusqlite::params;
use test_helpers::{
    approved_part, count_part_rows, create_test_db, part_ids, read_config_value, rejected_part,
};

fn engine_for(db_path: &str) -> StorageEngine {
    let repo = SqliteStateRepository::new(db_path).expect("打开仓储失败");
    StorageEngine::initialize(Some(Box::new(repo)))
}

#[test]
fn test_round_trip_preserves_state() {
    let (_temp, db_path) = create_test_db().unwrap();

    let mut engine = engine_for(&db_path);
    for id in part_ids("P", 23) {
        engine.admit(approved_part(&id));
    }
    for id in ["R9", "R1", "R5"] {
        engine.record_rejection(rejected_part(id));
    }
    engine.sync().unwrap();
    let expected = engine.state().clone();

    let repo = SqliteStateRepository::new(&db_path).unwrap();
    let loaded = repo.load().unwrap().expect("应有已保存状态");
    assert_eq!(loaded, expected);
    assert_eq!(
        loaded.rejected_parts.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec!["R9", "R1", "R5"]
    );
    assert_eq!(loaded.rejected_parts[0].rejection_reasons.len(), 3);
    assert_eq!(count_part_rows(&db_path).unwrap(), (23, 3));
}

#[test]
fn test_restart_continues_box_numbering() {
    let (_temp, db_path) = create_test_db().unwrap();

    {
        let mut engine = engine_for(&db_path);
        for id in part_ids("A", 14) {
            engine.admit(approved_part(&id));
        }
        engine.sync().unwrap();
    }

    let mut engine = engine_for(&db_path);
    assert_eq!(engine.state().active_box.id, 2);
    assert_eq!(engine.state().active_box.len(), 4);
    for id in part_ids("B", 6) {
        engine.admit(approved_part(&id));
    }
    assert_eq!(engine.state().closed_boxes.len(), 2);
    assert_eq!(engine.state().active_box.id, 3);
    assert_eq!(engine.state().box_counter, 3);
}

#[test]
fn test_sync_after_removal_deletes_rows() {
    let (_temp, db_path) = create_test_db().unwrap();

    let mut engine = engine_for(&db_path);
    engine.admit(approved_part("P1"));
    engine.admit(approved_part("P2"));
    engine.record_rejection(rejected_part("R1"));
    engine.sync().unwrap();

    assert!(engine.remove_by_id("P1").found);
    assert!(engine.remove_by_id("R1").found);
    engine.sync().unwrap();

    assert_eq!(count_part_rows(&db_path).unwrap(), (1, 0));
    let repo = SqliteStateRepository::new(&db_path).unwrap();
    let loaded = repo.load().unwrap().unwrap();
    assert_eq!(loaded.active_box.part_ids(), vec!["P2"]);
}

#[test]
fn test_empty_database_initializes_fresh_state() {
    let (_temp, db_path) = create_test_db().unwrap();
    let engine = engine_for(&db_path);
    assert_eq!(engine.state(), &StorageSystem::new());

    assert_eq!(
        read_config_value(&db_path, config_keys::BOX_COUNTER).unwrap(),
        Some("1".to_string())
    );
}

#[test]
fn test_reset_clears_database() {
    let (_temp, db_path) = create_test_db().unwrap();
    let mut engine = engine_for(&db_path);
    for id in part_ids("P", 11) {
        engine.admit(approved_part(&id));
    }
    engine.sync().unwrap();
    engine.reset().unwrap();

    assert_eq!(count_part_rows(&db_path).unwrap(), (0, 0));
    let reloaded = engine_for(&db_path);
    assert_eq!(reloaded.state(), &StorageSystem::new());
}

#[test]
fn test_legacy_database_without_open_box() {
    let temp = tempfile::NamedTempFile::new().unwrap();
    let db_path = temp.path().to_str().unwrap().to_string();

    // 旧版库结构: 无 seq 列,只有一个已封箱
    {
        let conn = open_sqlite_connection(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE pecas (
                id TEXT PRIMARY KEY,
                peso REAL NOT NULL,
                cor TEXT NOT NULL,
                comprimento REAL NOT NULL,
                aprovada BOOLEAN NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE caixas (
                id INTEGER PRIMARY KEY,
                fechada BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE sistema_config (chave TEXT PRIMARY KEY, valor TEXT NOT NULL);",
        )
        .unwrap();
        conn.execute("INSERT INTO caixas (id, fechada) VALUES (1, 1)", [])
            .unwrap();
        for i in 0..3 {
            conn.execute(
                "INSERT INTO pecas (id, peso, cor, comprimento, aprovada) VALUES (?1, 100.0, 'azul', 15.0, 1)",
                params![format!("L{}", i)],
            )
            .unwrap();
        }
        conn.execute(
            "INSERT INTO sistema_config (chave, valor) VALUES (?1, '1')",
            params![config_keys::BOX_COUNTER],
        )
        .unwrap();
    }

    let engine = engine_for(&db_path);
    let state = engine.state();
    assert_eq!(
        state.approved_parts.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec!["L0", "L1", "L2"]
    );
    assert_eq!(state.closed_boxes.len(), 1);
    assert_eq!(state.active_box.id, 2);
    assert_eq!(state.box_counter, 2);
}
