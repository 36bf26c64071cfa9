//! BDD step definitions for alert destinations

use beacon::alert::{Alert, AlertState, Query};
use beacon::config::DestinationConfig;
use beacon::destinations::AlertNotification;
use cucumber::gherkin::Step;
use cucumber::{given, then, when};

use crate::world::{BeaconWorld, RecordedRequest, Reply};

const HOST: &str = "http://bi.example.com";

fn only_request(world: &BeaconWorld) -> RecordedRequest {
    let requests = world.http.requests();
    assert_eq!(requests.len(), 1, "expected exactly one request: {requests:?}");
    requests[0].clone()
}

#[given(expr = "a {string} destination named {string} with options:")]
fn destination_with_options(
    world: &mut BeaconWorld,
    step: &Step,
    destination_type: String,
    name: String,
) {
    let mut options = serde_json::Map::new();
    if let Some(table) = step.table.as_ref() {
        for row in &table.rows {
            options.insert(row[0].clone(), serde_json::Value::String(row[1].clone()));
        }
    }
    world.config.destinations.push(DestinationConfig {
        name,
        destination_type,
        options,
    });
}

#[given(expr = "a mail relay at {string}")]
fn mail_relay(world: &mut BeaconWorld, url: String) {
    world.config.mail.relay_url = Some(url);
}

#[given(expr = "an alert {int} named {string} on query {int}")]
fn an_alert(world: &mut BeaconWorld, alert_id: i64, name: String, query_id: i64) {
    world.alert = Some(Alert::new(alert_id, name));
    world.query = Some(Query::new(query_id, "SELECT count(*) FROM events"));
}

#[given(expr = "the alert has custom subject {string} and body {string}")]
fn custom_subject_and_body(world: &mut BeaconWorld, subject: String, body: String) {
    let alert = world.alert.as_mut().expect("alert not set");
    alert.custom_subject = Some(subject);
    alert.custom_body = Some(body);
}

#[given(expr = "the destination endpoint answers with status {int}")]
fn endpoint_status(world: &mut BeaconWorld, status: u16) {
    *world.http.reply.lock().unwrap() = Reply::Status(status);
}

#[given("the destination endpoint is unreachable")]
fn endpoint_unreachable(world: &mut BeaconWorld) {
    *world.http.reply.lock().unwrap() = Reply::Unreachable;
}

#[when(expr = "the alert changes to {string} for destination {string}")]
async fn alert_changes(world: &mut BeaconWorld, state: String, destination: String) {
    world.beacon();
    let alert = world.alert.clone().expect("alert not set");
    let query = world.query.clone().expect("query not set");
    let notification =
        AlertNotification::new(&alert, &query, AlertState::parse(&state)).with_host(HOST);

    let beacon = world.beacon.as_ref().expect("beacon not built");
    world.notify_result = Some(beacon.notify(&destination, &notification).await);
}

#[when("the beacon is built")]
fn beacon_is_built(world: &mut BeaconWorld) {
    world.try_build();
}

#[then("the notification completes")]
fn notification_completes(world: &mut BeaconWorld) {
    let result = world.notify_result.as_ref().expect("no notification sent");
    result.as_ref().unwrap();
}

#[then(expr = "{int} request(s) is/are sent")]
fn requests_sent(world: &mut BeaconWorld, count: usize) {
    assert_eq!(world.http.requests().len(), count);
}

#[then(expr = "the request goes to {string}")]
fn request_url(world: &mut BeaconWorld, url: String) {
    assert_eq!(only_request(world).url, url);
}

#[then(expr = "the request header {string} is {string}")]
fn request_header(world: &mut BeaconWorld, name: String, value: String) {
    let request = only_request(world);
    let found = request
        .headers
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.clone());
    assert_eq!(found.as_deref(), Some(value.as_str()));
}

#[then(expr = "the request JSON at {string} is {string}")]
fn request_json_string(world: &mut BeaconWorld, pointer: String, expected: String) {
    let body = only_request(world).json();
    let value = body
        .pointer(&pointer)
        .unwrap_or_else(|| panic!("no value at {pointer} in {body}"));
    assert_eq!(value, &serde_json::Value::String(expected));
}

#[then(expr = "the request JSON has no value at {string}")]
fn request_json_missing(world: &mut BeaconWorld, pointer: String) {
    let body = only_request(world).json();
    assert!(body.pointer(&pointer).is_none(), "unexpected value in {body}");
}

#[then(expr = "the request form field {string} contains {string}")]
fn request_form_contains(world: &mut BeaconWorld, name: String, expected: String) {
    let request = only_request(world);
    let value = request.form_field(&name).expect("form field missing");
    assert!(value.contains(&expected), "{value:?} lacks {expected:?}");
}

#[then(expr = "the request form field {string} has {int} lines")]
fn request_form_lines(world: &mut BeaconWorld, name: String, lines: usize) {
    let request = only_request(world);
    let value = request.form_field(&name).expect("form field missing");
    assert_eq!(value.lines().count(), lines, "{value:?}");
}

#[then(expr = "building fails mentioning {string}")]
fn building_fails(world: &mut BeaconWorld, fragment: String) {
    let err = world.build_error.as_ref().expect("build unexpectedly succeeded");
    assert!(err.to_string().contains(&fragment), "{err}");
}
