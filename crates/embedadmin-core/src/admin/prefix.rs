use std::collections::BTreeMap;

///
/// PrefixAllocator
///
/// Hands out formset prefixes for one request. Repeats of a base name get
/// a numeric suffix: `phone`, `phone-2`, `phone-3`.
///

#[derive(Debug, Default)]
pub struct PrefixAllocator {
    seen: BTreeMap<String, usize>,
}

impl PrefixAllocator {
    pub fn next(&mut self, base: &str) -> String {
        let count = self.seen.entry(base.to_string()).or_insert(0);
        *count += 1;

        if *count == 1 {
            base.to_string()
        } else {
            format!("{base}-{count}")
        }
    }
}

///
/// TESTS
///
