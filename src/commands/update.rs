//! Update command handlers: changing one cell of an existing row.
//!
//! The replacement value is validated against the column it is headed for before anything is
//! sent, so a bad value never reaches the sheet.

use crate::api::{self, Mode};
use crate::args::UpdateFieldArgs;
use crate::commands::{validate_color, Out};
use crate::model::{
    parse_iso_date, Amount, Goal, GoalColumn, Kind, MonthKey, Tag, TagColumn, Transaction,
    TransactionColumn,
};
use crate::{Config, Result};
use anyhow::{bail, Context};
use serde_json::Value;
use std::str::FromStr;

/// Changes one cell of a registro row.
///
/// # Errors
/// - Returns an error if the field is not a registro column, the value does not parse for that
///   column, or the row does not exist.
pub async fn update_transaction(
    config: Config,
    mode: Mode,
    args: UpdateFieldArgs,
) -> Result<Out<Transaction>> {
    let column = TransactionColumn::from_header(args.field())?;
    let value = transaction_value(column, args.value())?;

    let mut backend = api::backend(&config, mode)?;
    api::update_transaction_field(backend.as_mut(), args.row(), column, value).await?;

    let snapshot = api::fetch_snapshot(backend.as_mut()).await?;
    let updated = snapshot
        .transactions()
        .iter()
        .find(|t| t.row_number() == Some(args.row()))
        .cloned()
        .with_context(|| format!("Registro row {} vanished after the update", args.row()))?;
    let message = format!(
        "Updated {} of registro row {}",
        column.as_header_str(),
        args.row()
    );
    Ok(Out::new(message, updated))
}

/// Changes one cell of a meta row.
pub async fn update_goal(config: Config, mode: Mode, args: UpdateFieldArgs) -> Result<Out<Goal>> {
    let column = GoalColumn::from_header(args.field())?;
    let value = goal_value(column, args.value())?;

    let mut backend = api::backend(&config, mode)?;
    api::update_goal_field(backend.as_mut(), args.row(), column, value).await?;

    let snapshot = api::fetch_snapshot(backend.as_mut()).await?;
    let updated = snapshot
        .goals()
        .iter()
        .find(|g| g.row_number() == Some(args.row()))
        .cloned()
        .with_context(|| format!("Meta row {} vanished after the update", args.row()))?;
    let message = format!(
        "Updated {} of meta row {}",
        column.as_header_str(),
        args.row()
    );
    Ok(Out::new(message, updated))
}

/// Changes one cell of an organizador row.
pub async fn update_tag(config: Config, mode: Mode, args: UpdateFieldArgs) -> Result<Out<Tag>> {
    let column = TagColumn::from_header(args.field())?;
    let value = tag_value(column, args.value())?;

    let mut backend = api::backend(&config, mode)?;
    api::update_tag_field(backend.as_mut(), args.row(), column, value).await?;

    let snapshot = api::fetch_snapshot(backend.as_mut()).await?;
    let updated = snapshot
        .tags()
        .iter()
        .find(|t| t.row_number() == Some(args.row()))
        .cloned()
        .with_context(|| format!("Organizador row {} vanished after the update", args.row()))?;
    let message = format!(
        "Updated {} of organizador row {}",
        column.as_header_str(),
        args.row()
    );
    Ok(Out::new(message, updated))
}

/// Converts the raw CLI value into the JSON the cell should hold, validated for its column.
fn transaction_value(column: TransactionColumn, raw: &str) -> Result<Value> {
    match column {
        TransactionColumn::Date => {
            let date = parse_iso_date(raw)
                .with_context(|| format!("Invalid date '{raw}', expected YYYY-MM-DD"))?;
            Ok(Value::String(date.format("%Y-%m-%d").to_string()))
        }
        TransactionColumn::Amount => {
            let amount =
                Amount::from_str(raw).with_context(|| format!("Invalid amount '{raw}'"))?;
            Ok(serde_json::to_value(amount)?)
        }
        TransactionColumn::Kind => {
            let kind = Kind::from_str(raw)
                .with_context(|| format!("Invalid tipo '{raw}', expected Receita or Despesa"))?;
            Ok(Value::String(kind.to_string()))
        }
        TransactionColumn::RowNumber => {
            bail!("ROW_NUMBER comes from the sheet position and cannot be changed")
        }
        _ => Ok(Value::String(raw.to_string())),
    }
}

fn goal_value(column: GoalColumn, raw: &str) -> Result<Value> {
    match column {
        GoalColumn::Month => {
            let month = MonthKey::from_str(raw)
                .with_context(|| format!("Invalid month '{raw}', expected MM/YYYY or MM/YY"))?;
            // The sheet keeps months in the short form.
            Ok(Value::String(month.short()))
        }
        GoalColumn::Target => {
            let target =
                Amount::from_str(raw).with_context(|| format!("Invalid amount '{raw}'"))?;
            Ok(serde_json::to_value(target)?)
        }
        GoalColumn::Tag => {
            if raw.trim().is_empty() {
                bail!("The meta needs a tag to constrain");
            }
            Ok(Value::String(raw.trim().to_string()))
        }
        GoalColumn::RowNumber => {
            bail!("ROW_NUMBER comes from the sheet position and cannot be changed")
        }
    }
}

fn tag_value(column: TagColumn, raw: &str) -> Result<Value> {
    match column {
        TagColumn::Name => {
            if raw.trim().is_empty() {
                bail!("The tag needs a name");
            }
            Ok(Value::String(raw.trim().to_string()))
        }
        TagColumn::Color => {
            validate_color(raw)?;
            Ok(Value::String(raw.to_string()))
        }
        TagColumn::Kind => Ok(Value::String(raw.to_string())),
        TagColumn::RowNumber => {
            bail!("ROW_NUMBER comes from the sheet position and cannot be changed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use serde_json::json;

    // === registro update tests ===

    #[tokio::test]
    async fn test_update_transaction_amount() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(2, "Valor", "200,50");
        let out = update_transaction(env.config(), Mode::Test, args)
            .await
            .unwrap();

        let contains = "Updated Valor of registro row 2";
        assert!(
            out.message().contains(contains),
            "Expected message to contain '{contains}', but message was {}",
            out.message()
        );
        assert_eq!("R$ 200,50", out.structure().unwrap().amount().to_string());

        // The sheet cell holds a typed number, not the CLI spelling.
        let state = env.get_state();
        assert_eq!(Some(&json!(200.5)), state.registro[0].get("Valor"));
    }

    #[tokio::test]
    async fn test_update_transaction_accented_header() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(2, "Descrição", "Feira da semana");
        update_transaction(env.config(), Mode::Test, args)
            .await
            .unwrap();

        // The accented spelling maps onto the canonical sheet header.
        let state = env.get_state();
        assert_eq!(
            Some(&json!("Feira da semana")),
            state.registro[0].get("Descricao")
        );
    }

    #[tokio::test]
    async fn test_update_transaction_rejects_an_unknown_field() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(2, "Conta", "Nubank");
        let result = update_transaction(env.config(), Mode::Test, args).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_transaction_rejects_a_bad_tipo_before_sending() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(2, "Tipo", "Gasto");
        let result = update_transaction(env.config(), Mode::Test, args).await;

        assert!(result.is_err());
        // Nothing was written.
        let state = env.get_state();
        assert_eq!(Some(&json!("Despesa")), state.registro[0].get("Tipo"));
    }

    #[tokio::test]
    async fn test_update_transaction_missing_row_errors() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(99, "Valor", "1,00");
        let result = update_transaction(env.config(), Mode::Test, args).await;

        assert!(result.is_err());
    }

    // === meta update tests ===

    #[tokio::test]
    async fn test_update_goal_month_writes_the_short_form() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(2, "Mes", "01/2026");
        let out = update_goal(env.config(), Mode::Test, args).await.unwrap();

        assert_eq!(
            "01/2026",
            out.structure().unwrap().month().unwrap().to_string()
        );
        let state = env.get_state();
        assert_eq!(Some(&json!("01/26")), state.metas[0].get("Mes"));
    }

    #[tokio::test]
    async fn test_update_goal_target() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(2, "Meta", "750");
        let out = update_goal(env.config(), Mode::Test, args).await.unwrap();

        assert_eq!("R$ 750,00", out.structure().unwrap().target().to_string());
        let state = env.get_state();
        assert_eq!(Some(&json!(750.0)), state.metas[0].get("Meta"));
    }

    #[tokio::test]
    async fn test_update_goal_rejects_a_bad_month() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(2, "Mes", "dezembro");
        let result = update_goal(env.config(), Mode::Test, args).await;

        assert!(result.is_err());
        let state = env.get_state();
        assert_eq!(Some(&json!("11/25")), state.metas[0].get("Mes"));
    }

    // === organizador update tests ===

    #[tokio::test]
    async fn test_update_tag_color() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(2, "Cor", "#123abc");
        update_tag(env.config(), Mode::Test, args).await.unwrap();

        let state = env.get_state();
        assert_eq!(Some(&json!("#123abc")), state.organizadores[0].get("Cor"));
    }

    #[tokio::test]
    async fn test_update_tag_rejects_a_bad_color() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(2, "Cor", "blue");
        let result = update_tag(env.config(), Mode::Test, args).await;

        assert!(result.is_err());
        let state = env.get_state();
        assert_eq!(Some(&json!("#e8743b")), state.organizadores[0].get("Cor"));
    }

    #[tokio::test]
    async fn test_update_row_number_is_rejected() {
        let env = TestEnv::new().await;

        let args = UpdateFieldArgs::new(2, "ROW_NUMBER", "9");
        assert!(update_transaction(env.config(), Mode::Test, args.clone())
            .await
            .is_err());
        assert!(update_goal(env.config(), Mode::Test, args.clone())
            .await
            .is_err());
        assert!(update_tag(env.config(), Mode::Test, args).await.is_err());
    }
}
