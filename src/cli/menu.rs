// ==========================================
// 零件质检装箱系统 - 交互菜单
// ==========================================
// 职责: 收集用户输入,调用 InspectionApi,渲染结果
// 红线: 菜单不含业务规则,只做展示与输入采集
// ==========================================

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use tabled::{builder::Builder, settings::Style};
use tracing::debug;

use crate::api::{ApiError, BoxView, EMPTY_VALUE_MESSAGE};
use crate::app::AppState;
use crate::domain::part::Part;
use crate::domain::types::PartFilter;
use crate::i18n::{t, t_with_args};

/// 分隔线宽度
const RULE_WIDTH: usize = 40;

// ==========================================
// MenuAction - 菜单项
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Register,
    ListParts,
    Remove,
    ListBoxes,
    Report,
    Save,
    Reset,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 8] = [
        MenuAction::Register,
        MenuAction::ListParts,
        MenuAction::Remove,
        MenuAction::ListBoxes,
        MenuAction::Report,
        MenuAction::Save,
        MenuAction::Reset,
        MenuAction::Exit,
    ];

    pub fn i18n_key(&self) -> &'static str {
        match self {
            MenuAction::Register => "menu.register",
            MenuAction::ListParts => "menu.list_parts",
            MenuAction::Remove => "menu.remove",
            MenuAction::ListBoxes => "menu.list_boxes",
            MenuAction::Report => "menu.report",
            MenuAction::Save => "menu.save",
            MenuAction::Reset => "menu.reset",
            MenuAction::Exit => "menu.exit",
        }
    }
}

// ==========================================
// 主循环
// ==========================================

/// 运行交互菜单直到用户选择退出
pub fn run(state: &mut AppState) -> Result<()> {
    let theme = ColorfulTheme::default();
    print_banner(state);

    loop {
        let labels: Vec<String> = MenuAction::ALL.iter().map(|a| t(a.i18n_key())).collect();
        println!();
        print_header(&t("menu.title"));
        let selection = Select::with_theme(&theme)
            .with_prompt(t("menu.prompt"))
            .items(&labels[..])
            .default(0)
            .interact()?;

        let action = MenuAction::ALL[selection];
        debug!(?action, "菜单选择");
        match action {
            MenuAction::Register => register_part(state, &theme)?,
            MenuAction::ListParts => list_parts(state, &theme)?,
            MenuAction::Remove => remove_part(state, &theme)?,
            MenuAction::ListBoxes => list_boxes(state),
            MenuAction::Report => println!("\n{}", state.inspection_api.report()),
            MenuAction::Save => save_now(state),
            MenuAction::Reset => reset(state, &theme)?,
            MenuAction::Exit => {
                if state.persistence_available {
                    save_now(state);
                }
                println!("\n{}", style(t("exit.goodbye")).bold());
                return Ok(());
            }
        }
    }
}

fn print_banner(state: &AppState) {
    let rule = "=".repeat(RULE_WIDTH + 10);
    println!("{}", style(&rule).dim());
    println!("{}", style(format!("{:^w$}", t("welcome.title"), w = RULE_WIDTH + 10)).bold());
    println!("{}", style(&rule).dim());
    println!("{}", t("welcome.subtitle"));
    if state.persistence_available {
        println!(
            "{}",
            style(t_with_args("welcome.database", &[("path", &state.config.db_path)])).dim()
        );
    } else {
        print_warning(&t("welcome.memory_only"));
    }
}

fn print_header(title: &str) {
    println!("{}", style("-".repeat(RULE_WIDTH)).dim());
    println!("{}", style(format!("{:^w$}", title, w = RULE_WIDTH)).bold());
    println!("{}", style("-".repeat(RULE_WIDTH)).dim());
}

fn print_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

fn print_error(message: &str) {
    println!("{} {}", style("✗").red(), message);
}

fn print_warning(message: &str) {
    println!("{} {}", style("!").yellow(), message);
}

/// 变更已生效但未落库
fn print_sync_error(sync_error: Option<&String>) {
    if let Some(msg) = sync_error {
        print_warning(&t_with_args("errors.sync_failed", &[("message", msg)]));
    }
}

fn ask(theme: &ColorfulTheme, prompt: &str) -> Result<String> {
    let value: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

// ==========================================
// 菜单动作
// ==========================================

fn register_part(state: &mut AppState, theme: &ColorfulTheme) -> Result<()> {
    println!();
    print_header(&t("register.header"));

    // ID 先行校验,避免重复录入其余字段
    let id = ask(theme, &t("register.id"))?;
    let id = id.trim().to_string();
    if id.is_empty() {
        print_error(&t("input.empty_id"));
        return Ok(());
    }
    if state.inspection_api.is_registered(&id) {
        print_error(&t_with_args("input.duplicate_id", &[("id", &id)]));
        return Ok(());
    }

    let input = crate::api::PartInput {
        id,
        weight: ask(theme, &t("register.weight"))?,
        color: ask(theme, &t("register.color"))?,
        length: ask(theme, &t("register.length"))?,
    };

    match state.inspection_api.register_part(input) {
        Ok(result) => {
            println!();
            if result.part.approved {
                print_success(&t_with_args("register.approved", &[("id", &result.part.id)]));
                println!("  {}", result.message);
            } else {
                print_error(&t_with_args("register.rejected", &[("id", &result.part.id)]));
                println!("  {}", t("register.reasons"));
                for reason in &result.part.rejection_reasons {
                    println!("    - {}", reason);
                }
            }
            print_sync_error(result.sync_error.as_ref());
        }
        Err(e) => print_error(&describe_api_error(&e)),
    }
    Ok(())
}

fn list_parts(state: &AppState, theme: &ColorfulTheme) -> Result<()> {
    println!();
    print_header(&t("list.header"));
    let options = [t("list.approved"), t("list.rejected"), t("list.all")];
    let selection = Select::with_theme(theme)
        .items(&options[..])
        .default(0)
        .interact()?;
    let filter = match selection {
        0 => PartFilter::Approved,
        1 => PartFilter::Rejected,
        _ => PartFilter::All,
    };

    let api = &state.inspection_api;
    if filter != PartFilter::Rejected {
        let approved = api.list_parts(PartFilter::Approved);
        println!();
        if approved.is_empty() {
            println!("{}", t("list.no_approved"));
        } else {
            let title = t_with_args("list.approved_title", &[("count", &approved.len().to_string())]);
            println!("{}", style(title).green().bold());
            let boxes = api.list_boxes();
            println!("{}", approved_table(&approved, &boxes));
        }
    }
    if filter != PartFilter::Approved {
        let rejected = api.list_parts(PartFilter::Rejected);
        println!();
        if rejected.is_empty() {
            println!("{}", t("list.no_rejected"));
        } else {
            let title = t_with_args("list.rejected_title", &[("count", &rejected.len().to_string())]);
            println!("{}", style(title).red().bold());
            println!("{}", rejected_table(&rejected));
        }
    }
    Ok(())
}

fn remove_part(state: &mut AppState, theme: &ColorfulTheme) -> Result<()> {
    println!();
    print_header(&t("remove.header"));
    let id = ask(theme, &t("remove.id"))?;
    let id = id.trim().to_string();
    if id.is_empty() {
        print_error(&t("input.empty_id"));
        return Ok(());
    }

    let confirmed = Confirm::with_theme(theme)
        .with_prompt(t_with_args("remove.confirm", &[("id", &id)]))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("{}", t("remove.cancelled"));
        return Ok(());
    }

    match state.inspection_api.remove_part(&id) {
        Ok(removed) if removed.outcome.found => {
            print_success(&removed.outcome.message);
            print_sync_error(removed.sync_error.as_ref());
        }
        Ok(removed) => print_error(&removed.outcome.message),
        Err(e) => print_error(&describe_api_error(&e)),
    }
    Ok(())
}

fn list_boxes(state: &AppState) {
    println!();
    print_header(&t("boxes.header"));
    let boxes: Vec<BoxView> = state
        .inspection_api
        .list_boxes()
        .into_iter()
        .filter(|b| b.closed || b.fill > 0)
        .collect();
    if boxes.is_empty() {
        println!("{}", t("boxes.none"));
        return;
    }
    println!("{}", boxes_table(&boxes));
}

fn save_now(state: &AppState) {
    if !state.persistence_available {
        print_error(&t("save.unavailable"));
        return;
    }
    match state.inspection_api.save_now() {
        Ok(()) => print_success(&t("save.done")),
        Err(e) => print_error(&describe_api_error(&e)),
    }
}

fn reset(state: &mut AppState, theme: &ColorfulTheme) -> Result<()> {
    let confirmed = Confirm::with_theme(theme)
        .with_prompt(t("reset.confirm"))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("{}", t("remove.cancelled"));
        return Ok(());
    }
    match state.inspection_api.reset() {
        Ok(()) => print_success(&t("reset.done")),
        Err(e) => print_error(&describe_api_error(&e)),
    }
    Ok(())
}

// ==========================================
// 渲染辅助
// ==========================================

/// API 错误转为当前语言的提示
pub fn describe_api_error(err: &ApiError) -> String {
    match err {
        ApiError::InvalidInput { field, message } => match field.as_str() {
            "id" => t("input.empty_id"),
            "color" => t("input.empty_color"),
            "weight" | "length" => {
                let label = t(&format!("register.{}", field));
                if message == EMPTY_VALUE_MESSAGE {
                    return t_with_args("input.empty_number", &[("field", &label)]);
                }
                let value = message.rsplit(": ").next().unwrap_or_default();
                t_with_args("input.invalid_number", &[("field", &label), ("value", value)])
            }
            _ => message.clone(),
        },
        ApiError::DuplicatePart(id) => t_with_args("input.duplicate_id", &[("id", id)]),
        ApiError::PersistenceError(msg) => t_with_args("errors.persistence", &[("message", msg)]),
        ApiError::InternalError(msg) => t_with_args("errors.internal", &[("message", msg)]),
    }
}

/// 合格零件表（含所在箱号）
pub fn approved_table(parts: &[&Part], boxes: &[BoxView]) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        t("list.col_id"),
        t("list.col_weight"),
        t("list.col_color"),
        t("list.col_length"),
        t("list.col_box"),
    ]);
    for part in parts {
        let box_label = boxes
            .iter()
            .find(|b| b.part_ids.iter().any(|id| id == &part.id))
            .map(|b| format!("#{}", b.id))
            .unwrap_or_else(|| "-".to_string());
        builder.push_record([
            part.id.clone(),
            format!("{:.1}", part.weight),
            part.color.clone(),
            format!("{:.1}", part.length),
            box_label,
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// 不合格零件表（原因逐行列出）
pub fn rejected_table(parts: &[&Part]) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        t("list.col_id"),
        t("list.col_weight"),
        t("list.col_color"),
        t("list.col_length"),
        t("list.col_reasons"),
    ]);
    for part in parts {
        builder.push_record([
            part.id.clone(),
            format!("{:.1}", part.weight),
            part.color.clone(),
            format!("{:.1}", part.length),
            part.rejection_reasons.join("\n"),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// 箱子表
pub fn boxes_table(boxes: &[BoxView]) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        t("boxes.col_box"),
        t("boxes.col_status"),
        t("boxes.col_fill"),
        t("boxes.col_parts"),
    ]);
    for b in boxes {
        let status = if b.closed {
            t("boxes.status_closed")
        } else {
            t("boxes.status_open")
        };
        builder.push_record([
            format!("#{}", b.id),
            status,
            format!("{}/{}", b.fill, crate::domain::BOX_CAPACITY),
            b.part_ids.join(", "),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(id: &str, approved: bool) -> Part {
        let reasons = if approved {
            Vec::new()
        } else {
            vec!["Weight out of range (95.0-105.0g): 120.0g".to_string()]
        };
        Part::restore(id.to_string(), 100.0, "blue".to_string(), 15.0, approved, reasons)
    }

    #[test]
    fn test_menu_actions_are_distinct() {
        let keys: std::collections::HashSet<_> =
            MenuAction::ALL.iter().map(|a| a.i18n_key()).collect();
        assert_eq!(keys.len(), MenuAction::ALL.len());
        assert_eq!(MenuAction::ALL.last(), Some(&MenuAction::Exit));
    }

    #[test]
    fn test_tables_contain_rows() {
        let approved = part("P1", true);
        let rejected = part("R1", false);
        let boxes = vec![BoxView {
            id: 3,
            closed: false,
            fill: 1,
            part_ids: vec!["P1".to_string()],
        }];

        let table = approved_table(&[&approved], &boxes);
        assert!(table.contains("P1"));
        assert!(table.contains("#3"));

        let table = rejected_table(&[&rejected]);
        assert!(table.contains("R1"));
        assert!(table.contains("Weight out of range"));

        let table = boxes_table(&boxes);
        assert!(table.contains("1/10"));
    }

    #[test]
    fn test_describe_api_error_keeps_details() {
        let msg = describe_api_error(&ApiError::PersistenceError("disk full".to_string()));
        assert!(msg.contains("disk full"));
        let msg = describe_api_error(&ApiError::DuplicatePart("P9".to_string()));
        assert!(msg.contains("P9"));
    }

    #[test]
    fn test_describe_numeric_input_errors() {
        let _guard = crate::i18n::LOCALE_TEST_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        crate::i18n::set_locale("en");

        let empty =
            describe_api_error(&ApiError::invalid_input("weight", EMPTY_VALUE_MESSAGE));
        assert_eq!(empty, "Weight (g) must not be empty");

        let bad = describe_api_error(&ApiError::invalid_input("length", "not a number: abc"));
        assert_eq!(bad, "Length (cm): enter a valid number (got 'abc')");
    }
}
