//! Demo: ensambla el stack desde el entorno y ejecuta unos scripts de
//! ejemplo con el intérprete local.
use std::sync::Arc;

use py_core::trigger::{ScriptDeclaration, TriggerPhase, TriggerSite};
use py_core::{ArgumentPathEvaluator, Arguments, ProcessorExt, ResultType};
use pyflow_rust::{build_stack, build_trigger_evaluator, init_logging, CONFIG};
use serde_json::json;

fn main() {
    init_logging();
    let config = &*CONFIG;
    let evaluator = Arc::new(ArgumentPathEvaluator::from_config(&config.resolvers.expression));
    let stack = match build_stack(config, evaluator) {
        Ok(stack) => stack,
        Err(e) => {
            eprintln!("[pyflow-demo] cannot build stack: {e}");
            std::process::exit(2);
        }
    };

    println!("=== PyFlow demo ===\n");

    match stack.processor.process("print(2 + 2)", Some(&ResultType::named("json")), &Arguments::new()) {
        Ok(out) => println!("print(2 + 2)                  -> {out:?}"),
        Err(e) => eprintln!("print(2 + 2) failed: {e}"),
    }

    match stack.processor.process_as::<i64>("test_var = 2 + 2\no4java{test_var}", &Arguments::new()) {
        Ok(out) => println!("o4java{{test_var}}             -> {out:?}"),
        Err(e) => eprintln!("result capture failed: {e}"),
    }

    let mut args = Arguments::new();
    args.insert("order".into(), json!({"items": [3, 4, 5], "customer": "ana"}));
    let script = "total = sum(spel{#order.items})\no4java{dict(customer=spel{#order.customer}, total=total)}";
    match stack.processor.process(script, Some(&ResultType::named("json")), &args) {
        Ok(out) => println!("spel{{#order.items}}           -> {out:?}"),
        Err(e) => eprintln!("expression script failed: {e}"),
    }

    let triggers = build_trigger_evaluator(config, Arc::clone(&stack.processor));
    let site = TriggerSite::new("checkout", TriggerPhase::After)
        .with_primary(ScriptDeclaration::new("print('after checkout', spel{#order_id}, spel{#result})"))
        .with_parameter("order_id", None, json!(17))
        .with_return_value(json!("ok"));
    match triggers.dispatch(site, Arguments::new()) {
        Ok(Some(handle)) => {
            let _ = handle.join();
            println!("trigger 'checkout'            -> detached");
        }
        Ok(None) => println!("trigger 'checkout'            -> inline"),
        Err(e) => eprintln!("trigger failed: {e}"),
    }
}
