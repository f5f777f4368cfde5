//! End-to-end dispatch through the HTTP-shaped adapters.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use funcbridge::{AxumAdapter, HttpAdapter, Registry, context, modular};
use serde_json::{Value, json};

fn math_registry() -> Registry {
    Registry::builder()
        .typed("add", |(x, y): (i64, i64)| async move { Ok(json!(x + y)) })
        .typed("mul", |(x, y): (i64, i64)| async move { Ok(json!(x * y)) })
        .build()
}

fn axum_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("https://bridge.example.com/call")
        .header("Host", "bridge.example.com")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn named_call_round_trips_through_axum() {
    let dispatcher = modular(math_registry());
    let adapter = AxumAdapter::new(axum_request(r#"{"name":"add","args":[2,3]}"#))
        .await
        .unwrap();

    let response = dispatcher.dispatch(adapter).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(5));
}

#[tokio::test]
async fn unknown_function_is_a_structured_404() {
    let dispatcher = modular(math_registry());
    let adapter = AxumAdapter::new(axum_request(r#"{"name":"div","args":[1,2]}"#))
        .await
        .unwrap();

    let response = dispatcher.dispatch(adapter).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "unknown_function");
    assert_eq!(body["error"]["message"], "unknown function: div");
}

#[tokio::test]
async fn malformed_body_is_a_structured_400() {
    let dispatcher = modular(math_registry());
    let adapter = AxumAdapter::new(axum_request("{definitely not json"))
        .await
        .unwrap();

    let response = dispatcher.dispatch(adapter).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "malformed_payload");
}

#[tokio::test]
async fn failing_handler_yields_structured_500() {
    let registry = Registry::builder()
        .function("boom", |_args: Vec<Value>| async { Err("bad".into()) })
        .build();
    let dispatcher = modular(registry);

    let adapter = AxumAdapter::new(axum_request("{}")).await.unwrap();
    let response = dispatcher.dispatch(adapter).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "bad");
}

#[tokio::test]
async fn capsule_sees_the_host_reported_by_the_adapter() {
    let registry = Registry::builder()
        .entry(
            "whoami",
            context(
                |ctx| Ok(json!([ctx.host])),
                |args: Vec<Value>| async move {
                    Ok(args.into_iter().next().unwrap_or(Value::Null))
                },
            ),
        )
        .build();
    let dispatcher = modular(registry);

    // Envelope args must be ignored for capsule entries.
    let adapter = AxumAdapter::new(axum_request(r#"{"args":["ignored"]}"#))
        .await
        .unwrap();
    let response = dispatcher.dispatch(adapter).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!("bridge.example.com"));

    // Same registry entry, different host framework, same answer.
    let request = Request::builder()
        .method("POST")
        .uri("/call")
        .header("Host", "other.example.net")
        .body(Vec::new())
        .unwrap();
    let response = dispatcher.dispatch(HttpAdapter::new(request)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(response.body()).unwrap();
    assert_eq!(body, json!("other.example.net"));
}

#[tokio::test]
async fn single_function_shorthand_over_http_adapter() {
    let registry = Registry::builder()
        .typed("add", |(x, y): (i64, i64)| async move { Ok(json!(x + y)) })
        .build();
    let dispatcher = modular(registry);

    // No name field: the single registered function is the implicit target.
    let request = Request::builder()
        .method("POST")
        .uri("/call")
        .body(br#"{"args":[2,3]}"#.to_vec())
        .unwrap();
    let response = dispatcher.dispatch(HttpAdapter::new(request)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), "5");
}

#[tokio::test]
async fn dispatchers_sharing_a_registry_stay_independent() {
    let registry = math_registry();
    let first = modular(registry.clone());
    let second = modular(registry);

    let (a, b) = tokio::join!(
        async {
            let adapter = AxumAdapter::new(axum_request(r#"{"name":"add","args":[1,2]}"#))
                .await
                .unwrap();
            first.dispatch(adapter).await
        },
        async {
            let adapter = AxumAdapter::new(axum_request(r#"{"name":"mul","args":[4,5]}"#))
                .await
                .unwrap();
            second.dispatch(adapter).await
        },
    );

    assert_eq!(body_json(a).await, json!(3));
    assert_eq!(body_json(b).await, json!(20));
}
