// ==========================================
// 零件质检装箱系统 - 状态数据仓储 (SQLite)
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化；save/load 均在单个事务内完成
// ==========================================

use crate::config::config_keys;
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::domain::packing_box::PackingBox;
use crate::domain::part::Part;
use crate::domain::state::StorageSystem;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::state_store::StateStore;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

// ==========================================
// SqliteStateRepository - 系统状态仓储
// ==========================================
/// 系统状态仓储
/// 职责: 管理 pecas / motivos_reprovacao / caixas / caixas_pecas / sistema_config 表
pub struct SqliteStateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStateRepository {
    /// 创建新的 SqliteStateRepository 实例（自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        let repo = Self::from_connection(Arc::new(Mutex::new(conn)))?;
        info!(db_path = %db_path, "状态仓储已就绪");
        Ok(repo)
    }

    /// 从已有连接创建仓储实例（自动建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            ensure_schema(&guard)?;
            match read_schema_version(&guard)? {
                Some(v) if v > CURRENT_SCHEMA_VERSION => {
                    warn!(
                        schema_version = v,
                        expected = CURRENT_SCHEMA_VERSION,
                        "数据库由更新版本创建,可能无法完整读取"
                    );
                }
                v => debug!(schema_version = ?v, "schema 版本检查通过"),
            }
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl StateStore for SqliteStateRepository {
    /// 加载完整状态
    ///
    /// # 返回
    /// - Ok(Some(StorageSystem)): 存储中有数据
    /// - Ok(None): 存储为空
    /// - Err: 数据库错误或数据无法解码
    fn load(&self) -> RepositoryResult<Option<StorageSystem>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // ===== 不合格原因 (按插入顺序) =====
        let mut reasons: HashMap<String, Vec<String>> = HashMap::new();
        {
            let mut stmt =
                tx.prepare("SELECT peca_id, motivo FROM motivos_reprovacao ORDER BY id")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (part_id, reason) = row?;
                reasons.entry(part_id).or_default().push(reason);
            }
        }

        // ===== 零件 =====
        let parts = {
            let mut stmt = tx.prepare(
                r#"
                SELECT id, peso, cor, comprimento, aprovada
                FROM pecas
                ORDER BY seq ASC, rowid ASC
                "#,
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, bool>(4)?,
                    ))
                })?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows.into_iter()
                .map(|(id, weight, color, length, approved)| {
                    let part_reasons = reasons.remove(&id).unwrap_or_default();
                    Part::restore(id, weight, color, length, approved, part_reasons)
                })
                .collect::<Vec<_>>()
        };

        // ===== 箱子 =====
        let boxes = {
            let mut stmt = tx.prepare("SELECT id, fechada FROM caixas ORDER BY id ASC")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, bool>(1)?)))?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        };

        let memberships = {
            let mut stmt = tx.prepare(
                "SELECT caixa_id, peca_id FROM caixas_pecas ORDER BY caixa_id ASC, ordem ASC",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        };

        let stored_counter: Option<String> = tx
            .query_row(
                "SELECT valor FROM sistema_config WHERE chave = ?1",
                params![config_keys::BOX_COUNTER],
                |row| row.get(0),
            )
            .optional()?;

        tx.commit()?;
        drop(conn);

        if parts.is_empty() && boxes.is_empty() {
            debug!("存储为空");
            return Ok(None);
        }

        let state = assemble_state(parts, boxes, memberships, stored_counter)?;
        info!(
            approved = state.approved_parts.len(),
            rejected = state.rejected_parts.len(),
            closed_boxes = state.closed_boxes.len(),
            active_box = state.active_box.id,
            "状态已从数据库加载"
        );
        Ok(Some(state))
    }

    /// 全量保存状态（单事务）
    fn save(&self, state: &StorageSystem) -> RepositoryResult<()> {
        // SQLite 将 NaN 绑定为 NULL,违反 NOT NULL 约束
        if let Some(bad) = state
            .approved_parts
            .iter()
            .chain(state.rejected_parts.iter())
            .find(|p| !p.weight.is_finite() || !p.length.is_finite())
        {
            return Err(RepositoryError::InvalidData {
                table: "pecas".to_string(),
                message: format!(
                    "part {} has a non-finite measurement (weight={}, length={})",
                    bad.id, bad.weight, bad.length
                ),
            });
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // ===== 零件: upsert + 重写原因 =====
        let mut live_ids: HashSet<&str> = HashSet::new();
        let ordered = state
            .approved_parts
            .iter()
            .enumerate()
            .chain(state.rejected_parts.iter().enumerate());
        for (seq, part) in ordered {
            live_ids.insert(part.id.as_str());
            tx.execute(
                r#"
                INSERT INTO pecas (id, peso, cor, comprimento, aprovada, seq)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    peso = excluded.peso,
                    cor = excluded.cor,
                    comprimento = excluded.comprimento,
                    aprovada = excluded.aprovada,
                    seq = excluded.seq
                "#,
                params![
                    part.id,
                    part.weight,
                    part.color,
                    part.length,
                    part.approved,
                    seq as i64,
                ],
            )?;
            tx.execute(
                "DELETE FROM motivos_reprovacao WHERE peca_id = ?1",
                params![part.id],
            )?;
            for reason in &part.rejection_reasons {
                tx.execute(
                    "INSERT INTO motivos_reprovacao (peca_id, motivo) VALUES (?1, ?2)",
                    params![part.id, reason],
                )?;
            }
        }

        // ===== 删除已不存在的零件 =====
        let stored_ids = {
            let mut stmt = tx.prepare("SELECT id FROM pecas")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<SqliteResult<Vec<_>>>()?;
            ids
        };
        let mut purged = 0usize;
        for id in stored_ids.iter().filter(|id| !live_ids.contains(id.as_str())) {
            tx.execute("DELETE FROM caixas_pecas WHERE peca_id = ?1", params![id])?;
            tx.execute("DELETE FROM motivos_reprovacao WHERE peca_id = ?1", params![id])?;
            tx.execute("DELETE FROM pecas WHERE id = ?1", params![id])?;
            purged += 1;
        }

        // ===== 箱子与装箱关系 =====
        tx.execute("DELETE FROM caixas_pecas", [])?;
        let all_boxes = state
            .closed_boxes
            .iter()
            .chain(std::iter::once(&state.active_box));
        let mut live_boxes: Vec<i64> = Vec::new();
        for b in all_boxes {
            live_boxes.push(b.id as i64);
            tx.execute(
                r#"
                INSERT INTO caixas (id, fechada) VALUES (?1, ?2)
                ON CONFLICT(id) DO UPDATE SET fechada = excluded.fechada
                "#,
                params![b.id as i64, b.closed],
            )?;
            for (ordem, part) in b.parts.iter().enumerate() {
                tx.execute(
                    "INSERT INTO caixas_pecas (caixa_id, peca_id, ordem) VALUES (?1, ?2, ?3)",
                    params![b.id as i64, part.id, ordem as i64],
                )?;
            }
        }
        let stored_boxes = {
            let mut stmt = tx.prepare("SELECT id FROM caixas")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0))?
                .collect::<SqliteResult<Vec<_>>>()?;
            ids
        };
        for id in stored_boxes.iter().filter(|id| !live_boxes.contains(*id)) {
            tx.execute("DELETE FROM caixas WHERE id = ?1", params![id])?;
        }

        // ===== 箱号计数器 =====
        tx.execute(
            r#"
            INSERT INTO sistema_config (chave, valor) VALUES (?1, ?2)
            ON CONFLICT(chave) DO UPDATE SET valor = excluded.valor
            "#,
            params![config_keys::BOX_COUNTER, state.box_counter.to_string()],
        )?;

        tx.commit()?;
        debug!(
            parts = live_ids.len(),
            boxes = live_boxes.len(),
            purged,
            box_counter = state.box_counter,
            "状态已同步到数据库"
        );
        Ok(())
    }

    fn clear(&self) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM caixas_pecas;
             DELETE FROM motivos_reprovacao;
             DELETE FROM pecas;
             DELETE FROM caixas;
             DELETE FROM sistema_config;",
        )?;
        tx.commit()?;
        info!("数据库已清空");
        Ok(())
    }
}

/// 由行数据组装状态
fn assemble_state(
    parts: Vec<Part>,
    boxes: Vec<(i64, bool)>,
    memberships: Vec<(i64, String)>,
    stored_counter: Option<String>,
) -> RepositoryResult<StorageSystem> {
    let by_id: HashMap<&str, &Part> = parts.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut box_parts: HashMap<i64, Vec<Part>> = HashMap::new();
    for (box_id, part_id) in memberships {
        let part = by_id
            .get(part_id.as_str())
            .ok_or_else(|| RepositoryError::DecodeError {
                table: "caixas_pecas".to_string(),
                message: format!("box #{} references unknown part {}", box_id, part_id),
            })?;
        box_parts.entry(box_id).or_default().push((*part).clone());
    }

    let mut closed_boxes = Vec::new();
    let mut active_box: Option<PackingBox> = None;
    let mut max_box_id: u32 = 0;
    for (raw_id, closed) in boxes {
        let id = u32::try_from(raw_id).map_err(|_| RepositoryError::DecodeError {
            table: "caixas".to_string(),
            message: format!("invalid box id {}", raw_id),
        })?;
        max_box_id = max_box_id.max(id);
        let b = PackingBox {
            id,
            parts: box_parts.remove(&raw_id).unwrap_or_default(),
            closed,
        };
        if closed {
            closed_boxes.push(b);
        } else if let Some(previous) = active_box.replace(b) {
            warn!(box_id = previous.id, "存在多个未封箱,以箱号最大者为在装箱");
        }
    }

    let mut box_counter = match stored_counter {
        Some(raw) => raw.trim().parse::<u32>().map_err(|e| RepositoryError::DecodeError {
            table: "sistema_config".to_string(),
            message: format!("{}={}: {}", config_keys::BOX_COUNTER, raw, e),
        })?,
        None => max_box_id,
    };

    let active_box = match active_box {
        Some(b) => {
            box_counter = box_counter.max(b.id);
            b
        }
        None => {
            box_counter = box_counter.max(max_box_id) + 1;
            PackingBox::new(box_counter)
        }
    };

    let (approved_parts, rejected_parts): (Vec<Part>, Vec<Part>) =
        parts.into_iter().partition(|p| p.approved);

    Ok(StorageSystem {
        approved_parts,
        rejected_parts,
        closed_boxes,
        active_box,
        box_counter,
    })
}
