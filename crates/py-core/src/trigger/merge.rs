//! Merges deterministas para metadata y argumentos.
//!
//! Ambos son "shallow": las claves de `b` reemplazan a las de `a`. Para la
//! metadata se conserva la posición de la primera aparición de cada script.

use crate::Arguments;

use super::TriggerMetadata;

/// Merge shallow de metadata: las entradas de `next` sustituyen a las de `acc`.
pub fn merge_metadata(acc: &mut TriggerMetadata, next: TriggerMetadata) {
    for (script, profiles) in next {
        acc.insert(script, profiles);
    }
}

/// Merge shallow de argumentos: `extra` gana sobre `base`.
pub fn merge_arguments(base: &Arguments, extra: &Arguments) -> Arguments {
    let mut out = base.clone();
    for (k, v) in extra {
        out.insert(k.clone(), v.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_metadata_overrides_and_keeps_order() {
        let mut acc = TriggerMetadata::new();
        acc.insert("a.py".into(), vec!["dev".into()]);
        acc.insert("b.py".into(), vec![]);
        let mut next = TriggerMetadata::new();
        next.insert("a.py".into(), vec!["prod".into()]);
        next.insert("c.py".into(), vec![]);
        merge_metadata(&mut acc, next);
        let keys: Vec<&String> = acc.keys().collect();
        assert_eq!(keys, vec!["a.py", "b.py", "c.py"]);
        assert_eq!(acc["a.py"], vec!["prod".to_string()]);
    }

    #[test]
    fn extra_arguments_win() {
        let mut base = Arguments::new();
        base.insert("x".into(), json!(1));
        base.insert("y".into(), json!(2));
        let mut extra = Arguments::new();
        extra.insert("y".into(), json!(20));
        let merged = merge_arguments(&base, &extra);
        assert_eq!(merged["x"], json!(1));
        assert_eq!(merged["y"], json!(20));
    }
}
