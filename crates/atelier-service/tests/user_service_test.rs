//! Integration tests for the user lifecycle.

mod common;

use atelier_core::domain::ImageRatio;
use atelier_core::Entity;
use chrono::{Duration, Utc};
use common::TestContext;
use uuid::Uuid;

#[tokio::test]
async fn test_create_user_stores_a_guest() {
    let ctx = TestContext::new();

    let guest = ctx.services.users.create_user().await.value_or_raise(None).unwrap();

    assert!(guest.is_guest);
    assert!(!guest.is_verified);
    assert!(guest.username.starts_with("user_"));
    assert_eq!(guest.salt.len(), 9);
    assert_eq!(guest.audit.created_by, Some(ctx.actor_id));
    assert_eq!(ctx.store.count("users"), 1);
}

#[tokio::test]
async fn test_verify_user_signs_up_and_sends_code() {
    let ctx = TestContext::new();
    let guest = ctx.services.users.create_user().await.value_or_raise(None).unwrap();

    let user = ctx
        .services
        .users
        .verify_user(guest.id(), "ada@example.com", "ada", "Sup3rSecret")
        .await
        .value_or_raise(None)
        .unwrap();

    assert_eq!(user.id(), guest.id());
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.username, "ada");
    assert!(!user.is_guest);
    assert!(ctx.password_matches(&user, "Sup3rSecret"));

    let message = ctx.email.last().unwrap();
    assert_eq!(message.recipient, "ada@example.com");
    assert!(message.subject.starts_with("Studio Verification Code - "));
    assert!(message.body.contains("Welcome to Studio, ada!"));
    assert!(message.is_html);
    assert_eq!(ctx.email.last_code().len(), 9);
}

#[tokio::test]
async fn test_verify_user_rejections() {
    let ctx = TestContext::new();
    ctx.signed_up("taken@example.com", "taken").await;
    let guest = ctx.services.users.create_user().await.value_or_raise(None).unwrap();
    let users = &ctx.services.users;

    let taken = users.verify_user(guest.id(), "new@example.com", "taken", "Sup3rSecret").await;
    assert_eq!(taken.error().unwrap().error_code, "UserService-VerifyUser-E02");

    let in_use = users.verify_user(guest.id(), "taken@example.com", "fresh", "Sup3rSecret").await;
    assert_eq!(in_use.error().unwrap().error_code, "UserService-VerifyUser-E05");

    let weak = users.verify_user(guest.id(), "new@example.com", "fresh", "short").await;
    assert_eq!(weak.error().unwrap().error_code, "UserService-EnsurePasswordStrength-E01");

    let invalid = users.verify_user(guest.id(), "not-an-email", "fresh", "Sup3rSecret").await;
    assert_eq!(invalid.error().unwrap().error_code, "UserService-VerifyUser-E04");

    let missing = users.verify_user(Uuid::now_v7(), "new@example.com", "fresh", "Sup3rSecret").await;
    assert_eq!(missing.error().unwrap().error_code, "UserService-GetUserById-E02");
}

#[tokio::test]
async fn test_verify_user_twice_is_rejected() {
    let ctx = TestContext::new();
    let user = ctx.signed_up("ada@example.com", "ada").await;

    let again = ctx
        .services
        .users
        .verify_user(user.id(), "other@example.com", "other", "Sup3rSecret")
        .await;
    assert_eq!(again.error().unwrap().error_code, "UserService-VerifyUser-E03");
}

#[tokio::test]
async fn test_failed_email_does_not_undo_sign_up() {
    let ctx = TestContext::new();
    ctx.email.fail();
    let guest = ctx.services.users.create_user().await.value_or_raise(None).unwrap();

    let user = ctx
        .services
        .users
        .verify_user(guest.id(), "ada@example.com", "ada", "Sup3rSecret")
        .await;

    assert!(user.is_success());
    assert!(ctx.email.sent().is_empty());
}

#[tokio::test]
async fn test_send_verification_code_rules() {
    let ctx = TestContext::new();
    let users = &ctx.services.users;

    let guest = users.create_user().await.value_or_raise(None).unwrap();
    let no_email = users.send_verification_code(guest.id()).await;
    assert_eq!(no_email.error().unwrap().error_code, "UserService-SendVerificationCode-E04");

    let user = ctx.signed_up("ada@example.com", "ada").await;
    let too_soon = users.send_verification_code(user.id()).await;
    assert_eq!(too_soon.error().unwrap().error_code, "UserService-SendVerificationCode-E03");

    let code = ctx.email.last_code();
    users.verify_email(user.id(), &code).await.value_or_raise(None).unwrap();
    let verified = users.send_verification_code(user.id()).await;
    assert_eq!(verified.error().unwrap().error_code, "UserService-SendVerificationCode-E02");
}

#[tokio::test]
async fn test_send_verification_code_after_interval() {
    let ctx = TestContext::new();
    let users = &ctx.services.users;
    let user = ctx.signed_up("ada@example.com", "ada").await;
    let first_code = ctx.email.last_code();

    let mut stored = users.users().get_by_id(user.id()).await.value_or_raise(None).unwrap();
    stored.verification_send_time = Some(Utc::now() - Duration::minutes(2));
    ctx.users().upsert_by_id(stored).await.value_or_raise(None).unwrap();

    assert_eq!(users.send_verification_code(user.id()).await.value(), Some(&true));
    assert_eq!(ctx.email.sent().len(), 2);

    // Only the latest code is accepted.
    let second_code = ctx.email.last_code();
    if first_code != second_code {
        let stale = users.verify_email(user.id(), &first_code).await;
        assert_eq!(stale.error().unwrap().error_code, "UserService-VerifyEmail-E04");
    }
    assert!(users.verify_email(user.id(), &second_code).await.value().unwrap().is_verified);
}

#[tokio::test]
async fn test_verify_email() {
    let ctx = TestContext::new();
    let users = &ctx.services.users;
    let user = ctx.signed_up("ada@example.com", "ada").await;

    let wrong = users.verify_email(user.id(), "000000000").await;
    assert_eq!(wrong.error().unwrap().error_code, "UserService-VerifyEmail-E04");
    assert_eq!(wrong.error().unwrap().message, "Invalid code.");

    let verified = users.verify_email(user.id(), &ctx.email.last_code()).await;
    assert!(verified.value().unwrap().is_verified);
}

#[tokio::test]
async fn test_verify_email_without_code_sent() {
    let ctx = TestContext::new();
    let guest = ctx.services.users.create_user().await.value_or_raise(None).unwrap();

    let result = ctx.services.users.verify_email(guest.id(), "123456789").await;
    assert_eq!(result.error().unwrap().error_code, "UserService-VerifyEmail-E04");
}

#[tokio::test]
async fn test_verify_email_expired() {
    let ctx = TestContext::new();
    let users = &ctx.services.users;
    let user = ctx.signed_up("ada@example.com", "ada").await;

    let mut stored = users.users().get_by_id(user.id()).await.value_or_raise(None).unwrap();
    stored.verification_send_time = Some(Utc::now() - Duration::days(2));
    ctx.users().upsert_by_id(stored).await.value_or_raise(None).unwrap();

    let expired = users.verify_email(user.id(), &ctx.email.last_code()).await;
    assert_eq!(expired.error().unwrap().error_code, "UserService-VerifyEmail-E03");
}

#[tokio::test]
async fn test_add_role() {
    let ctx = TestContext::new();
    let users = &ctx.services.users;
    let guest = users.create_user().await.value_or_raise(None).unwrap();

    let admin = users.add_role(guest.id(), "Admin").await.value_or_raise(None).unwrap();
    assert!(admin.is_admin());

    let again = users.add_role(guest.id(), "Admin").await;
    let error = again.error().unwrap();
    assert_eq!(error.error_code, "UserService-AddRole-E02");
    assert_eq!(error.status, 400);
}

#[tokio::test]
async fn test_set_profile_image() {
    let ctx = TestContext::new();
    let users = &ctx.services.users;
    let guest = users.create_user().await.value_or_raise(None).unwrap();

    let user = users
        .set_profile_image(guest.id(), "https://images.test/me.png")
        .await
        .value_or_raise(None)
        .unwrap();
    assert_eq!(user.profile_image_url.as_deref(), Some("https://images.test/me.png"));

    let missing = users.set_profile_image(Uuid::now_v7(), "x").await;
    assert_eq!(missing.error().unwrap().error_code, "UserService-GetUserById-E02");
}

#[tokio::test]
async fn test_generate_profile_images() {
    let ctx = TestContext::new();
    let users = &ctx.services.users;
    let guest = users.create_user().await.value_or_raise(None).unwrap();

    let urls = users
        .generate_profile_images(guest.id(), "a fox in a scarf")
        .await
        .value_or_raise(None)
        .unwrap();

    assert_eq!(urls.len(), 3);
    assert_eq!(ctx.generator.calls(), vec![("a fox in a scarf".to_string(), ImageRatio::Square, 3)]);
}

#[tokio::test]
async fn test_entity_operations_through_user_service() {
    let ctx = TestContext::new();
    let users = ctx.services.users.users();
    let a = ctx.services.users.create_user().await.value_or_raise(None).unwrap();
    let b = ctx.services.users.create_user().await.value_or_raise(None).unwrap();

    assert_eq!(users.get_all().await.value().unwrap().len(), 2);
    assert_eq!(users.get_by_ids(&[a.id()]).await.value().unwrap().len(), 1);

    assert_eq!(users.delete_by_id(b.id()).await.value(), Some(&true));
    let gone = users.delete_by_id(b.id()).await;
    let error = gone.error().unwrap();
    assert_eq!(error.error_code, "UserService-GetUserById-E02");
    assert_eq!(error.message, "Could not find User");
}
