//! Service operations log under their own spans.

mod common;

use anyhow::Result;
use tracing_test::traced_test;

use common::{new_user, users_module, Store};

#[tokio::test]
#[traced_test]
async fn create_and_delete_are_logged() -> Result<()> {
    let service = users_module(Store::Memory).await.service();

    let user = service
        .create_user(new_user("John", "john@example.com"))
        .await?;
    assert!(service.delete_user(user.id).await?);

    assert!(logs_contain("users.service.create_user"));
    assert!(logs_contain("Successfully created user with id=1"));
    assert!(logs_contain("Successfully deleted user"));
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn missing_user_update_is_logged_without_saving() -> Result<()> {
    let service = users_module(Store::Memory).await.service();

    assert!(service
        .update_user(7, new_user("Ghost", "ghost@example.com"))
        .await?
        .is_none());
    assert!(logs_contain("User not found, nothing to update"));
    assert!(!logs_contain("Successfully updated user"));
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn database_delete_reports_affected_rows() -> Result<()> {
    let service = users_module(Store::Sqlite).await.service();

    let user = service
        .create_user(new_user("John", "john@example.com"))
        .await?;
    assert!(service.delete_user(user.id).await?);

    assert!(logs_contain("rows_affected=1"));
    Ok(())
}
