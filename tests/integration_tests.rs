use lms_progress_rust::extract::{extract_duration, extract_video_id, DEFAULT_DURATION_SECS};
use lms_progress_rust::session::{
    extract_verification_token, interpret_login_response, interpret_submission_response,
};
use lms_progress_rust::target::{parse_duration_minutes, TargetReference};
use lms_progress_rust::{LmsError, ProgressRecord};
use reqwest::StatusCode;

const TARGET_URL: &str = "https://lms.example.test/Learning/Index/123?csm=5&cb=7&cs=9";

const LOGIN_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<body>
    <form action="/Account/Login" method="post">
        <input name="__RequestVerificationToken" type="hidden" value="CfDJ8E5ievq2">
        <input name="Username" type="text">
        <input name="Password" type="password">
    </form>
</body>
</html>
"#;

const VIDEO_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Learning</title></head>
<body>
    <div id="player-container"></div>
    <script>
        $(document).ready(function () {
            InitPlayer({ videoId: "999", autoplay: false });
        });
    </script>
</body>
</html>
"#;

#[test]
fn test_full_pipeline() {
    // Every stage between the CLI arguments and the multipart form,
    // driven by canned server pages and replies.
    let target = TargetReference::parse(TARGET_URL).unwrap();

    let token = extract_verification_token(LOGIN_PAGE).unwrap();
    assert_eq!(token, "CfDJ8E5ievq2");

    let user_id = interpret_login_response(r#"{"Success":"Success","UserID":"42"}"#, "3759").unwrap();
    assert_eq!(user_id, "42");

    let video_id = extract_video_id(VIDEO_PAGE).unwrap();
    assert_eq!(video_id, "999");

    let duration = parse_duration_minutes("2").unwrap();
    assert_eq!(duration, 120);

    let record = ProgressRecord::synthesize(&target, &video_id, &user_id, duration).unwrap();
    let fields = record.form_fields().unwrap();

    assert_eq!(fields.course_id, "123");
    assert_eq!(fields.course_section_module_id, "5");
    assert_eq!(fields.cb, "7");

    let inner: serde_json::Value = serde_json::from_str(&fields.progress_data).unwrap();
    assert_eq!(inner["courseId"], 123);
    assert_eq!(inner["courseBatchId"], "7");
    assert_eq!(inner["courseSectionId"], 9);
    assert_eq!(inner["courseSectionModuleId"], 5);
    assert_eq!(inner["videoId"], 999);
    assert_eq!(inner["userId"], "42");
    assert_eq!(inner["progress"], 100);

    let timestamps = inner["timestamp"].as_array().unwrap();
    assert_eq!(timestamps.len(), 120);
    assert_eq!(timestamps[0], "1");
    assert_eq!(timestamps[119], "120");

    let reply = interpret_submission_response(StatusCode::OK, r#"{"IsUpdated":true}"#).unwrap();
    assert!(reply.contains("IsUpdated"));
}

#[test]
fn test_rejected_login() {
    let body = r#"{"Success":"Failed","Message":"Invalid username or password."}"#;
    let err = interpret_login_response(body, "3759").unwrap_err();

    assert!(matches!(err, LmsError::Auth(_)));
    assert!(err.to_string().contains("Invalid username or password."));
}

#[test]
fn test_expired_session_detection() {
    // The LMS answers an expired session with the login page and a 200.
    let login_redirect_body = "<html><head><title>Login</title></head></html>";
    let err = interpret_submission_response(StatusCode::OK, login_redirect_body).unwrap_err();
    assert!(err.to_string().contains("200"));

    let err = interpret_submission_response(StatusCode::FOUND, "").unwrap_err();
    assert!(err.to_string().contains("302"));
}

#[test]
fn test_page_duration_fallback() {
    let page = r#"<script>var player = { "videoId": 4, "duration": 90 };</script>"#;
    assert_eq!(extract_video_id(page).as_deref(), Some("4"));
    assert_eq!(extract_duration(page), 90);

    assert_eq!(extract_duration(VIDEO_PAGE), DEFAULT_DURATION_SECS);
}
