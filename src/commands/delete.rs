//! Delete command handlers.
//!
//! Only meta and organizador rows can be deleted. The proxy offers no delete operation for the
//! registro tab, so the ledger of transactions stays append-only.

use crate::api::{self, Mode};
use crate::args::DeleteRowArgs;
use crate::commands::Out;
use crate::{Config, Result};

/// Deletes a meta row. Rows below it shift up and take new row numbers.
pub async fn delete_goal(config: Config, mode: Mode, args: DeleteRowArgs) -> Result<Out<()>> {
    let mut backend = api::backend(&config, mode)?;
    api::delete_goal(backend.as_mut(), args.row()).await?;

    let snapshot = api::fetch_snapshot(backend.as_mut()).await?;
    let remaining = snapshot.goals().len();
    let message = format!(
        "Deleted meta row {}; {} meta row{} remain",
        args.row(),
        remaining,
        if remaining == 1 { "" } else { "s" }
    );
    Ok(Out::new_message(message))
}

/// Deletes an organizador row. Registro rows that carry the tag keep it; they just lose the
/// color and kind the organizador supplied.
pub async fn delete_tag(config: Config, mode: Mode, args: DeleteRowArgs) -> Result<Out<()>> {
    let mut backend = api::backend(&config, mode)?;
    api::delete_tag(backend.as_mut(), args.row()).await?;

    let snapshot = api::fetch_snapshot(backend.as_mut()).await?;
    let remaining = snapshot.tags().len();
    let message = format!(
        "Deleted organizador row {}; {} organizador row{} remain",
        args.row(),
        remaining,
        if remaining == 1 { "" } else { "s" }
    );
    Ok(Out::new_message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use serde_json::json;

    #[tokio::test]
    async fn test_delete_goal_renumbers_the_rows_below() {
        let env = TestEnv::new().await;

        let args = DeleteRowArgs::new(2);
        let out = delete_goal(env.config(), Mode::Test, args).await.unwrap();

        let contains = "Deleted meta row 2; 3 meta rows remain";
        assert!(
            out.message().contains(contains),
            "Expected message to contain '{contains}', but message was {}",
            out.message()
        );

        // The row that was number 3 is now number 2.
        let state = env.get_state();
        assert_eq!(3, state.metas.len());
        assert_eq!(Some(&json!("Transporte")), state.metas[0].get("Tag"));
    }

    #[tokio::test]
    async fn test_delete_goal_missing_row_errors() {
        let env = TestEnv::new().await;

        let args = DeleteRowArgs::new(99);
        let result = delete_goal(env.config(), Mode::Test, args).await;

        assert!(result.is_err());
        assert_eq!(4, env.get_state().metas.len());
    }

    #[tokio::test]
    async fn test_delete_tag() {
        let env = TestEnv::new().await;

        let args = DeleteRowArgs::new(9);
        let out = delete_tag(env.config(), Mode::Test, args).await.unwrap();

        let contains = "7 organizador rows remain";
        assert!(
            out.message().contains(contains),
            "Expected message to contain '{contains}', but message was {}",
            out.message()
        );
        let state = env.get_state();
        assert!(state
            .organizadores
            .iter()
            .all(|row| row.get("Tag") != Some(&json!("Carro"))));
    }
}
