use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print an error with its cause chain, plus advice for provisioning errors
pub fn report_error(err: &anyhow::Error) {
    error(&format!("{err:#}"));

    if let Some(category) = error_category(err) {
        eprintln!("  {}", category.description().bold());
        eprintln!("  {} {}", "→".cyan(), category.advice());
    }
}

/// Category of the first provisioning error in the chain, if any
pub fn error_category(err: &anyhow::Error) -> Option<appversion::ErrorCategory> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<appversion::Error>())
        .map(appversion::Error::category)
}

/// Truncate a string for display, keeping the end
pub fn truncate_start(value: &str, max_len: usize) -> String {
    let len = value.chars().count();
    if len <= max_len {
        value.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let tail: String = value.chars().skip(len - (max_len - 3)).collect();
        format!("...{tail}")
    }
}
