//! Insert command handlers.
//!
//! Every insert appends a row to its tab and then fetches the sheet again, so the reported
//! result reflects what the sheet actually holds.

use crate::api::{self, Mode};
use crate::args::{InsertGoalArgs, InsertTagArgs, InsertTransactionArgs};
use crate::commands::{validate_color, Out};
use crate::model::{Goal, Tag, Transaction, TAG_SLOT_COUNT};
use crate::{Config, Result};
use anyhow::bail;

/// Appends a registro row built from `args`.
///
/// # Errors
/// - Returns an error if more than four tags are given.
/// - Returns an error if the proxy rejects the write.
pub async fn insert_transaction(
    config: Config,
    mode: Mode,
    args: InsertTransactionArgs,
) -> Result<Out<Transaction>> {
    if args.tags().len() > TAG_SLOT_COUNT {
        bail!(
            "A registro row has {TAG_SLOT_COUNT} tag slots, got {} tags",
            args.tags().len()
        );
    }
    let transaction = Transaction::new(
        args.date(),
        args.amount(),
        args.kind(),
        args.tags().to_vec(),
        args.description().to_string(),
    );

    let mut backend = api::backend(&config, mode)?;
    api::add_transaction(backend.as_mut(), &transaction).await?;

    let snapshot = api::fetch_snapshot(backend.as_mut()).await?;
    let added = snapshot
        .transactions()
        .last()
        .cloned()
        .unwrap_or(transaction);
    let message = format!(
        "Added the registro; the sheet now has {} registro row(s)",
        snapshot.transactions().len()
    );
    Ok(Out::new(message, added))
}

/// Appends a meta row built from `args`.
///
/// A meta for a month and tag that already have one does not replace the old row; the sheet
/// keeps both and the later row wins when progress is computed.
pub async fn insert_goal(config: Config, mode: Mode, args: InsertGoalArgs) -> Result<Out<Goal>> {
    if args.tag().trim().is_empty() {
        bail!("The meta needs a tag to constrain");
    }
    let goal = Goal::new(args.month(), args.tag().to_string(), args.target());

    let mut backend = api::backend(&config, mode)?;
    api::add_goal(backend.as_mut(), &goal).await?;

    let snapshot = api::fetch_snapshot(backend.as_mut()).await?;
    let added = snapshot.goals().last().cloned().unwrap_or(goal);
    let message = format!(
        "Added the meta for '{}' in {}; the sheet now has {} meta row(s)",
        args.tag(),
        args.month(),
        snapshot.goals().len()
    );
    Ok(Out::new(message, added))
}

/// Appends an organizador row built from `args`.
///
/// # Errors
/// - Returns an error if the name is blank or the color is not a hex code.
pub async fn insert_tag(config: Config, mode: Mode, args: InsertTagArgs) -> Result<Out<Tag>> {
    if args.name().trim().is_empty() {
        bail!("The tag needs a name");
    }
    validate_color(args.color())?;
    let tag = Tag::new(
        args.name().to_string(),
        args.color().to_string(),
        args.kind().unwrap_or_default().to_string(),
    );

    let mut backend = api::backend(&config, mode)?;
    api::add_tag(backend.as_mut(), &tag).await?;

    let snapshot = api::fetch_snapshot(backend.as_mut()).await?;
    let added = snapshot.tags().last().cloned().unwrap_or(tag);
    let message = format!(
        "Added the tag '{}'; the sheet now has {} organizador row(s)",
        args.name(),
        snapshot.tags().len()
    );
    Ok(Out::new(message, added))
}
