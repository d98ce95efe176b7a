// ==========================================
// 零件质检装箱系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一建表逻辑 (表名与旧版 sistema_pecas.db 兼容)
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：只用于提示/告警，不做自动迁移
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// 表结构:
/// - pecas: 零件主表 (seq 记录集合内顺序)
/// - motivos_reprovacao: 不合格原因 (按自增 id 保序)
/// - caixas: 箱子
/// - caixas_pecas: 箱子-零件关联 (ordem 记录箱内顺序)
/// - sistema_config: 系统配置 (contador_caixas)
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS pecas (
            id TEXT PRIMARY KEY,
            peso REAL NOT NULL,
            cor TEXT NOT NULL,
            comprimento REAL NOT NULL,
            aprovada BOOLEAN NOT NULL,
            seq INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS motivos_reprovacao (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            peca_id TEXT NOT NULL,
            motivo TEXT NOT NULL,
            FOREIGN KEY (peca_id) REFERENCES pecas(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS caixas (
            id INTEGER PRIMARY KEY,
            fechada BOOLEAN NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS caixas_pecas (
            caixa_id INTEGER NOT NULL,
            peca_id TEXT NOT NULL,
            ordem INTEGER NOT NULL,
            PRIMARY KEY (caixa_id, peca_id),
            FOREIGN KEY (caixa_id) REFERENCES caixas(id) ON DELETE CASCADE,
            FOREIGN KEY (peca_id) REFERENCES pecas(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS sistema_config (
            chave TEXT PRIMARY KEY,
            valor TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    // 旧版库没有 seq 列: 补列后按 rowid 回填
    if !has_column(conn, "pecas", "seq")? {
        conn.execute_batch(
            "ALTER TABLE pecas ADD COLUMN seq INTEGER NOT NULL DEFAULT 0;
             UPDATE pecas SET seq = rowid;",
        )?;
    }

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 判断表是否包含指定列
fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names.iter().any(|n| n == column))
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_legacy_table_gets_seq_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE pecas (
                id TEXT PRIMARY KEY, peso REAL NOT NULL, cor TEXT NOT NULL,
                comprimento REAL NOT NULL, aprovada BOOLEAN NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
             );
             INSERT INTO pecas (id, peso, cor, comprimento, aprovada) VALUES ('P1', 100, 'azul', 15, 1);
             INSERT INTO pecas (id, peso, cor, comprimento, aprovada) VALUES ('P2', 100, 'azul', 15, 1);",
        )
        .unwrap();

        ensure_schema(&conn).unwrap();

        assert!(has_column(&conn, "pecas", "seq").unwrap());
        let seqs: Vec<i64> = conn
            .prepare("SELECT seq FROM pecas ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn test_schema_version_absent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }
}
