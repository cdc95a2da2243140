mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

#[tokio::test]
async fn nickname_change_updates_profile_and_session() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;

    let response = context
        .send(post_json("/api/user/nickname", json!({ "nickname": "먹방러" }), Some(&token)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "success": true, "message": "닉네임이 변경되었습니다." }));

    let profile = context.send(get("/api/user", Some(&token))).await;
    assert_eq!(profile.body["nickname"], "먹방러");

    let check = context.send(get("/session-check", Some(&token))).await;
    assert_eq!(check.body["user"]["nickname"], "먹방러");
}

#[tokio::test]
async fn blank_nickname_is_rejected() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;

    for body in [json!({ "nickname": "   " }), json!({})] {
        let response = context
            .send(post_json("/api/user/nickname", body, Some(&token)))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.message(), "유효한 닉네임을 입력해주세요.");
    }
}

#[tokio::test]
async fn password_change_then_login_with_the_new_one() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;

    let response = context
        .send(post_json(
            "/api/user/password",
            json!({ "newPassword": "newpass99", "confirmPassword": "newpass99" }),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "비밀번호가 성공적으로 변경되었습니다.");

    assert_eq!(context.login("abc", "longpass1").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(context.login("abc", "newpass99").await.status, StatusCode::OK);
}

#[tokio::test]
async fn rejected_password_change_leaves_the_hash_alone() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;
    let before = context.users.get("abc").await.unwrap().password;

    let cases = [
        (
            json!({ "newPassword": "newpass99", "confirmPassword": "newpass98" }),
            "새 비밀번호와 비밀번호 확인이 일치하지 않습니다.",
        ),
        (
            json!({ "newPassword": "short", "confirmPassword": "short" }),
            "비밀번호는 최소 8자 이상이어야 합니다.",
        ),
        (
            json!({ "newPassword": "newpass99" }),
            "새 비밀번호와 비밀번호 확인을 모두 입력해주세요.",
        ),
    ];

    for (body, message) in cases {
        let response = context
            .send(post_json("/api/user/password", body, Some(&token)))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.message(), message);
    }

    assert_eq!(context.users.get("abc").await.unwrap().password, before);
    assert_eq!(context.login("abc", "longpass1").await.status, StatusCode::OK);
}

#[tokio::test]
async fn verify_password_checks_the_stored_hash() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;

    let ok = context
        .send(post_json(
            "/api/user/verify-password",
            json!({ "currentPassword": "longpass1" }),
            Some(&token),
        ))
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["success"], true);
    assert_eq!(ok.message(), "현재 비밀번호가 확인되었습니다.");

    let wrong = context
        .send(post_json(
            "/api/user/verify-password",
            json!({ "currentPassword": "nope-nope" }),
            Some(&token),
        ))
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.message(), "현재 비밀번호가 일치하지 않습니다.");

    let missing = context
        .send(post_json("/api/user/verify-password", json!({}), Some(&token)))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.message(), "현재 비밀번호를 입력해주세요.");
}

#[tokio::test]
async fn photo_upload_stores_the_file_and_updates_the_picture() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;

    let response = context
        .send(post_multipart(
            "/api/user/upload-photo",
            "profilePhoto",
            "me.png",
            PNG_BYTES,
            Some(&token),
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    let photo_url = response.body["photoUrl"].as_str().unwrap().to_string();
    assert!(photo_url.starts_with("/uploads/"));
    assert!(photo_url.ends_with("-me.png"));

    let file_name = photo_url.trim_start_matches("/uploads/");
    let stored = std::fs::read(context.upload_dir.path().join(file_name)).unwrap();
    assert_eq!(stored, PNG_BYTES);

    let profile = context.send(get("/api/user", Some(&token))).await;
    assert_eq!(profile.body["picture"], photo_url.as_str());

    // Served back under the public prefix.
    let served = context.app.clone();
    let fetched = send(&served, get(&photo_url, None)).await;
    assert_eq!(fetched.status, StatusCode::OK);
}

#[tokio::test]
async fn photo_upload_without_the_file_field_fails() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;

    let response = context
        .send(post_multipart(
            "/api/user/upload-photo",
            "somethingElse",
            "me.png",
            PNG_BYTES,
            Some(&token),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "파일 업로드에 실패했습니다.");
}

#[tokio::test]
async fn photo_upload_with_a_json_body_fails_with_a_message() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;

    let response = context
        .send(post_json(
            "/api/user/upload-photo",
            json!({ "profilePhoto": "me.png" }),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "파일 업로드에 실패했습니다.");
}

#[tokio::test]
async fn photo_upload_over_the_body_limit_reports_the_size() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;

    // The context caps uploads at 1 MiB.
    let mut content = PNG_BYTES.to_vec();
    content.resize(1024 * 1024 + 200 * 1024, 0);

    let response = context
        .send(post_multipart(
            "/api/user/upload-photo",
            "profilePhoto",
            "big.png",
            &content,
            Some(&token),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "파일 크기가 너무 큽니다.");
    assert!(context.users.get("abc").await.unwrap().picture.is_none());
}

#[tokio::test]
async fn photo_upload_just_over_the_cap_reports_the_size() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;

    let mut content = PNG_BYTES.to_vec();
    content.resize(1024 * 1024 + 1, 0);

    let response = context
        .send(post_multipart(
            "/api/user/upload-photo",
            "profilePhoto",
            "big.png",
            &content,
            Some(&token),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "파일 크기가 너무 큽니다.");
}

#[tokio::test]
async fn photo_upload_rejects_non_images() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;

    let response = context
        .send(post_multipart(
            "/api/user/upload-photo",
            "profilePhoto",
            "evil.png",
            b"#!/bin/sh\necho pwned\n",
            Some(&token),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.message(),
        "이미지 파일(JPEG, PNG, GIF, WEBP)만 업로드할 수 있습니다."
    );
    assert!(context.users.get("abc").await.unwrap().picture.is_none());
    assert_eq!(std::fs::read_dir(context.upload_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn delete_user_removes_the_row_and_every_session() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;
    let other_device = context.login("abc", "longpass1").await.session_cookie.unwrap();

    let response = context.send(delete("/api/delete-user", Some(&token))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "회원탈퇴가 완료되었습니다.");
    assert!(response.set_cookie.unwrap().contains("Max-Age=0"));

    assert!(context.users.get("abc").await.is_none());
    assert_eq!(context.send(get("/api/user", Some(&token))).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        context.send(get("/api/user", Some(&other_device))).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(context.login("abc", "longpass1").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(context.sessions.len().await, 0);
}

#[tokio::test]
async fn profile_of_a_vanished_row_is_404() {
    let context = TestContext::new();
    let token = context.signed_in("abc", "longpass1").await;
    let other_device = context.login("abc", "longpass1").await.session_cookie.unwrap();

    // Row removed behind the session's back, session kept.
    use matjip::repositories::user::UserRepository;
    context.users.delete("abc").await.unwrap();

    let profile = context.send(get("/api/user", Some(&other_device))).await;
    assert_eq!(profile.status, StatusCode::NOT_FOUND);
    assert_eq!(profile.message(), "사용자를 찾을 수 없습니다.");

    let delete_again = context.send(delete("/api/delete-user", Some(&token))).await;
    assert_eq!(delete_again.status, StatusCode::NOT_FOUND);
}
