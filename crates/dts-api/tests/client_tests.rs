// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use dts_api::{Api, ApiError, HttpTransport, MemoryTokenStore, TokenStore};
use dts_app::{
    AddDocumentForm, ApiOutcome, AssignQrForm, DocumentId, LoginRedirect, RegisterUserForm,
    SubmitAction,
};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

struct Exchange {
    method: &'static str,
    url: &'static str,
    status: u16,
    body: String,
}

fn exchange(method: &'static str, url: &'static str, status: u16, body: impl Into<String>) -> Exchange {
    Exchange {
        method,
        url,
        status,
        body: body.into(),
    }
}

#[derive(Debug)]
struct Captured {
    authorization: Option<String>,
    accept: Option<String>,
    body: String,
}

fn serve(exchanges: Vec<Exchange>) -> Result<(String, JoinHandle<Vec<Captured>>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut captured = Vec::new();
        for expected in exchanges {
            let mut request = server.recv().expect("request expected");
            assert_eq!(request.method().as_str(), expected.method);
            assert_eq!(request.url(), expected.url);

            let header = |name: &'static str| {
                request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv(name))
                    .map(|header| header.value.as_str().to_owned())
            };
            let authorization = header("Authorization");
            let accept = header("Accept");
            let mut body = String::new();
            request
                .as_reader()
                .read_to_string(&mut body)
                .expect("request body should be readable");
            captured.push(Captured {
                authorization,
                accept,
                body,
            });

            let response = Response::from_string(expected.body)
                .with_status_code(expected.status)
                .with_header(
                    Header::from_bytes("Content-Type", "application/json")
                        .expect("valid content type header"),
                );
            request.respond(response).expect("response should succeed");
        }
        captured
    });

    Ok((addr, handle))
}

fn api(base_url: &str, token: Option<&str>) -> Result<(Api<HttpTransport>, Arc<MemoryTokenStore>)> {
    let tokens = Arc::new(MemoryTokenStore::new(token));
    let transport = HttpTransport::new(base_url, Duration::from_secs(2), tokens.clone())?;
    Ok((Api::new(transport), tokens))
}

fn join(handle: JoinHandle<Vec<Captured>>) -> Vec<Captured> {
    handle.join().expect("server thread should join")
}

#[test]
fn login_stores_token_and_reports_redirect() -> Result<()> {
    let (addr, handle) = serve(vec![exchange(
        "POST",
        "/api/login",
        200,
        r#"{"access_token":"tok-1","redirect_to":"mayors_page"}"#,
    )])?;
    let (api, tokens) = api(&addr, None)?;

    let outcome = api.login("mayor", "secret")?;
    assert_eq!(outcome, ApiOutcome::Success(LoginRedirect::MayorsPage));
    assert_eq!(tokens.load()?.as_deref(), Some("tok-1"));

    let captured = join(handle);
    assert_eq!(captured[0].authorization, None);
    assert!(captured[0].body.contains(r#""username":"mayor""#));
    Ok(())
}

#[test]
fn rejected_login_keeps_existing_session() -> Result<()> {
    let (addr, handle) = serve(vec![
        exchange("POST", "/api/login", 401, r#"{"message":"Unauthorized"}"#),
        exchange("POST", "/api/login", 200, r#"{"redirect_to":"home"}"#),
    ])?;
    let (api, tokens) = api(&addr, Some("still-valid"))?;

    assert_eq!(
        api.login("clerk", "wrong")?,
        ApiOutcome::GeneralError("incorrect username or password".to_owned())
    );
    assert_eq!(
        api.login("clerk", "right")?,
        ApiOutcome::GeneralError("login failed: no token received".to_owned())
    );
    assert_eq!(tokens.load()?.as_deref(), Some("still-valid"));

    join(handle);
    Ok(())
}

#[test]
fn login_reply_that_is_not_json_keeps_existing_session() -> Result<()> {
    let (addr, handle) = serve(vec![exchange(
        "POST",
        "/api/login",
        200,
        "<html>maintenance</html>",
    )])?;
    let (api, tokens) = api(&addr, Some("still-valid"))?;

    assert_eq!(
        api.login("clerk", "right")?,
        ApiOutcome::GeneralError("login failed: no token received".to_owned())
    );
    assert_eq!(tokens.load()?.as_deref(), Some("still-valid"));

    join(handle);
    Ok(())
}

#[test]
fn blank_credentials_never_reach_the_server() -> Result<()> {
    let (api, _) = api("http://127.0.0.1:1", None)?;
    assert_eq!(
        api.login("", "secret")?,
        ApiOutcome::GeneralError("Please enter both username and password.".to_owned())
    );
    Ok(())
}

#[test]
fn missing_token_fails_before_any_request() -> Result<()> {
    let (api, _) = api("http://127.0.0.1:1", None)?;
    let error = api.my_documents().expect_err("request should need a token");
    assert!(matches!(error, ApiError::MissingToken));
    assert!(error.needs_login());
    Ok(())
}

#[test]
fn unreachable_server_reports_connection_error() -> Result<()> {
    let tokens = Arc::new(MemoryTokenStore::new(Some("tok")));
    let transport = HttpTransport::new("http://127.0.0.1:1", Duration::from_millis(200), tokens)?;
    let error = Api::new(transport)
        .dashboard_counts()
        .expect_err("nothing listens on port 1");
    assert!(matches!(error, ApiError::Connection { .. }));
    assert!(error.to_string().contains("[server].base_url"));
    Ok(())
}

#[test]
fn unauthorized_response_clears_the_token() -> Result<()> {
    let (addr, handle) = serve(vec![exchange(
        "GET",
        "/api/home",
        401,
        r#"{"message":"Unauthenticated."}"#,
    )])?;
    let (api, tokens) = api(&addr, Some("expired"))?;

    let error = api.dashboard_counts().expect_err("401 should fail");
    assert!(matches!(error, ApiError::Unauthorized));
    assert_eq!(tokens.load()?, None);

    join(handle);
    Ok(())
}

#[test]
fn documents_are_fetched_with_bearer_token() -> Result<()> {
    let (addr, handle) = serve(vec![exchange(
        "GET",
        "/api/my-documents-list",
        200,
        r#"{"data":[{"id":1,"doc_title":"Budget","tracking_number":"SJC-1","status":1},{"id":2,"doc_title":null}]}"#,
    )])?;
    let (api, _) = api(&addr, Some("tok-9"))?;

    let documents = api.my_documents()?;
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].status.as_deref(), Some("1"));
    assert_eq!(documents[1].doc_title, None);

    let captured = join(handle);
    assert_eq!(captured[0].authorization.as_deref(), Some("Bearer tok-9"));
    assert_eq!(captured[0].accept.as_deref(), Some("application/json"));
    Ok(())
}

#[test]
fn documents_without_a_data_list_are_unexpected() -> Result<()> {
    let (addr, handle) = serve(vec![exchange(
        "GET",
        "/api/my-documents-list",
        200,
        r#"{"data":{"id":1}}"#,
    )])?;
    let (api, _) = api(&addr, Some("tok"))?;

    let error = api.my_documents().expect_err("object is not a list");
    assert!(matches!(error, ApiError::UnexpectedPayload { .. }));

    join(handle);
    Ok(())
}

#[test]
fn detail_and_attachments_use_the_document_id() -> Result<()> {
    let (addr, handle) = serve(vec![
        exchange(
            "GET",
            "/api/my-docs-view/7",
            200,
            r#"{"data":{"tracking_number":"SJC-7","doc_title":"Ordinance","remarks":null}}"#,
        ),
        exchange("GET", "/api/attached-files/7", 200, r#"{}"#),
    ])?;
    let (api, _) = api(&addr, Some("tok"))?;

    let detail = api.document_detail(DocumentId::new(7))?;
    assert_eq!(detail.tracking_number.as_deref(), Some("SJC-7"));
    assert!(api.attached_files(DocumentId::new(7))?.is_empty());

    join(handle);
    Ok(())
}

#[test]
fn delete_failure_becomes_general_error() -> Result<()> {
    let (addr, handle) = serve(vec![
        exchange("DELETE", "/api/delete-doc/3", 500, r#"{"message":"Cannot delete."}"#),
        exchange("DELETE", "/api/delete-doc/4", 200, r#"{"message":"Deleted"}"#),
    ])?;
    let (api, _) = api(&addr, Some("tok"))?;

    assert_eq!(
        api.delete_document(DocumentId::new(3))?,
        ApiOutcome::GeneralError("Cannot delete.".to_owned())
    );
    assert_eq!(api.delete_document(DocumentId::new(4))?, ApiOutcome::Success(()));

    join(handle);
    Ok(())
}

#[test]
fn add_document_sends_trimmed_values_and_reports_field_errors() -> Result<()> {
    let (addr, handle) = serve(vec![exchange(
        "POST",
        "/api/save-add-doc",
        422,
        r#"{"errors":{"doctype":["The doctype field is required."]}}"#,
    )])?;
    let (api, _) = api(&addr, Some("tok"))?;

    let form = AddDocumentForm {
        doctitle: "  Budget memo  ".to_owned(),
        ..AddDocumentForm::default()
    };
    let ApiOutcome::FieldErrors(errors) = api.add_document(&form, SubmitAction::Draft)? else {
        panic!("expected field errors");
    };
    assert_eq!(errors.first("doctype"), Some("The doctype field is required."));

    let captured = join(handle);
    let body: serde_json::Value = serde_json::from_str(&captured[0].body)?;
    assert_eq!(body["doctitle"], "Budget memo");
    assert_eq!(body["doctype"], "----");
    assert_eq!(body["status"], 2);
    Ok(())
}

#[test]
fn register_validates_locally_before_sending() -> Result<()> {
    let (api, _) = api("http://127.0.0.1:1", Some("tok"))?;
    let ApiOutcome::FieldErrors(errors) = api.register_user(&RegisterUserForm::default())? else {
        panic!("expected local validation errors");
    };
    assert_eq!(errors.first("username"), Some("Username is required."));
    Ok(())
}

#[test]
fn register_ignores_returned_token() -> Result<()> {
    let (addr, handle) = serve(vec![exchange(
        "POST",
        "/api/register",
        201,
        r#"{"access_token":"new-user-token"}"#,
    )])?;
    let (api, tokens) = api(&addr, Some("admin-token"))?;

    let form = RegisterUserForm {
        name: "Ben".to_owned(),
        last_name: "Santos".to_owned(),
        designation: "Clerk".to_owned(),
        contact: "0917".to_owned(),
        username: "bsantos".to_owned(),
        password: "pw".to_owned(),
        password_confirmation: "pw".to_owned(),
        ..RegisterUserForm::default()
    };
    assert_eq!(api.register_user(&form)?, ApiOutcome::Success(()));
    assert_eq!(tokens.load()?.as_deref(), Some("admin-token"));

    join(handle);
    Ok(())
}

#[test]
fn register_error_object_maps_to_fields() -> Result<()> {
    let (addr, handle) = serve(vec![exchange(
        "POST",
        "/api/register",
        422,
        r#"{"error":{"username":["The username has already been taken."]}}"#,
    )])?;
    let (api, _) = api(&addr, Some("tok"))?;

    let form = RegisterUserForm {
        name: "Ana".to_owned(),
        last_name: "Reyes".to_owned(),
        designation: "Clerk".to_owned(),
        contact: "0917".to_owned(),
        username: "areyes".to_owned(),
        password: "pw".to_owned(),
        password_confirmation: "pw".to_owned(),
        ..RegisterUserForm::default()
    };
    let ApiOutcome::FieldErrors(errors) = api.register_user(&form)? else {
        panic!("expected field errors");
    };
    assert_eq!(
        errors.first("username"),
        Some("The username has already been taken.")
    );

    join(handle);
    Ok(())
}

#[test]
fn users_and_departments_accept_server_shapes() -> Result<()> {
    let (addr, handle) = serve(vec![
        exchange(
            "GET",
            "/api/list-user",
            200,
            r#"{"users":[{"id":1,"name":"Ana","active":"1"}],"total_pages":"3"}"#,
        ),
        exchange(
            "GET",
            "/api/department",
            200,
            r#"{"office":{"0":{"id":1,"dept_description":"City Treasurer","dept_code":"CTO"},"1":{"id":2,"dept_code":"ICTO"}}}"#,
        ),
    ])?;
    let (api, _) = api(&addr, Some("tok"))?;

    let page = api.list_users()?;
    assert_eq!(page.users.len(), 1);
    assert_eq!(page.total_pages, 3);

    let departments = api.departments()?;
    let codes: Vec<&str> = departments.iter().map(|dept| dept.code()).collect();
    assert_eq!(codes, ["CTO", "ICTO"]);
    assert_eq!(departments[1].label(), "ICTO");

    join(handle);
    Ok(())
}

#[test]
fn qr_series_list_shapes() -> Result<()> {
    let row = r#"{"series":"S-1","office":"City Hall","initial_count":5}"#;
    let bare = format!("[{row}]");
    let data = format!(r#"{{"data":[{row}]}}"#);
    let qr = format!(r#"{{"qr":{{"a":{row}}}}}"#);
    let records = format!(r#"{{"records":[{row}]}}"#);

    let url = "/api/qr-office-list/City%20Hall";
    let (addr, handle) = serve(vec![
        exchange("GET", url, 200, bare),
        exchange("GET", url, 200, data),
        exchange("GET", url, 200, qr),
        exchange("GET", url, 200, records),
        exchange("GET", url, 200, r#"{"status":"ok"}"#),
    ])?;
    let (api, _) = api(&addr, Some("tok"))?;

    for _ in 0..4 {
        let series = api.qr_series("City Hall")?;
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].series.as_deref(), Some("S-1"));
    }
    let error = api.qr_series("City Hall").expect_err("unknown shape");
    assert!(matches!(error, ApiError::UnexpectedPayload { .. }));

    join(handle);
    Ok(())
}

#[test]
fn qr_series_without_a_name_are_skipped() -> Result<()> {
    let body = r#"[
        {"series":"ICTO-2026-10-001","office":"ICTO","initial_count":50},
        {"series":null,"office":"ICTO","initial_count":25},
        {"series":"","office":"ICTO"},
        {"office":"ICTO"},
        {"series":"ICTO-2026-11-002","office":"ICTO","used":"3"}
    ]"#;
    let (addr, handle) = serve(vec![exchange("GET", "/api/qr-office-list/ICTO", 200, body)])?;
    let (api, _) = api(&addr, Some("tok"))?;

    let series = api.qr_series("ICTO")?;
    let names: Vec<&str> = series
        .iter()
        .filter_map(|record| record.series.as_deref())
        .collect();
    assert_eq!(names, ["ICTO-2026-10-001", "ICTO-2026-11-002"]);
    assert_eq!(series[1].used, Some(3));

    join(handle);
    Ok(())
}

#[test]
fn qr_assignment_reports_errors_in_successful_responses() -> Result<()> {
    let (addr, handle) = serve(vec![
        exchange(
            "POST",
            "/api/assign-new-qr-series",
            200,
            r#"{"errors":{"amount":["Exceeds the monthly allocation."]}}"#,
        ),
        exchange("POST", "/api/assign-new-qr-series", 200, r#"{"message":"Assigned"}"#),
    ])?;
    let (api, _) = api(&addr, Some("tok"))?;

    let form = AssignQrForm {
        selected_office: "ICTO".to_owned(),
        amount: "25".to_owned(),
        for_month_year: "2026-10".to_owned(),
    };
    let ApiOutcome::FieldErrors(errors) = api.assign_qr_series(&form)? else {
        panic!("expected embedded field errors");
    };
    assert_eq!(errors.first("amount"), Some("Exceeds the monthly allocation."));
    assert_eq!(api.assign_qr_series(&form)?, ApiOutcome::Success(()));

    let captured = join(handle);
    let body: serde_json::Value = serde_json::from_str(&captured[0].body)?;
    assert_eq!(body["amount"], 25);
    assert_eq!(body["for_month_year"], "2026-10");
    Ok(())
}

#[test]
fn print_summary_reads_series_counts() -> Result<()> {
    let (addr, handle) = serve(vec![exchange(
        "GET",
        "/print-qr-series/S-1/ICTO",
        200,
        r#"{"series":"S-1","office":"ICTO","for_month_year":"2026-10","initial_count":100,"remaining":"40","used":60}"#,
    )])?;
    let (api, _) = api(&addr, Some("tok"))?;

    let summary = api.print_qr_series("S-1", "ICTO")?;
    assert_eq!(summary.remaining, Some(40));
    assert_eq!(summary.used, Some(60));

    join(handle);
    Ok(())
}

#[test]
fn logout_clears_token_only_on_success() -> Result<()> {
    let (addr, handle) = serve(vec![
        exchange("POST", "/api/logout", 500, r#"{"message":"try later"}"#),
        exchange("POST", "/api/logout", 200, r#"{"message":"Logged out"}"#),
    ])?;
    let (api, tokens) = api(&addr, Some("tok"))?;

    let error = api.logout().expect_err("500 should fail");
    assert_eq!(error.to_string(), "server error (500): try later");
    assert_eq!(tokens.load()?.as_deref(), Some("tok"));

    api.logout()?;
    assert_eq!(tokens.load()?, None);

    join(handle);
    Ok(())
}
