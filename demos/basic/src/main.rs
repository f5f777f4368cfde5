use funcbridge::{Registry, context, modular, run};
use serde_json::{Value, json};

#[tokio::main]
async fn main() -> funcbridge::Result<()> {
    let registry = Registry::builder()
        .typed("add", |(x, y): (f64, f64)| async move { Ok(json!(x + y)) })
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

    run(modular(registry)).await
}
