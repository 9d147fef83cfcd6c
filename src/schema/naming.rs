//! Name derivation between wire fields, CLI flags and generated identifiers.

/// Segments rendered fully upper-case in formatted names
const ACRONYMS: &[&str] = &["id", "url", "crn", "api"];

/// Derive the CLI flag name for a wire (or alias) name.
///
/// Names containing `_` have it replaced by `-`; otherwise every capital
/// letter becomes `-` plus its lowercase form. The result is always lowercase.
///
/// `toolchain_id` → `toolchain-id`, `workerQueueCredentials` → `worker-queue-credentials`
pub fn cli_name(name: &str) -> String {
    if name.contains('_') {
        return name.replace('_', "-").to_lowercase();
    }

    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Derive the PascalCase identifier the client generator uses for a name.
///
/// `private_worker` → `PrivateWorker`, `instance_id` → `InstanceID`,
/// `apiKey` → `APIKey`
pub fn formatted_name(name: &str) -> String {
    split_segments(name)
        .iter()
        .map(|segment| {
            if ACRONYMS.contains(&segment.to_lowercase().as_str()) {
                segment.to_uppercase()
            } else {
                capitalize(segment)
            }
        })
        .collect()
}

fn split_segments(name: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
