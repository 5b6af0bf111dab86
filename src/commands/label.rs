//! `appver label` - version label for a bundle filename

use anyhow::Result;
use appversion::derive_label;

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, filename: &str) -> Result<()> {
    let label = derive_label(filename);

    if label.is_empty() {
        ui::warn(&format!("'{filename}' yields an empty label and would be rejected"));
        return Ok(());
    }

    if ctx.verbose > 0 {
        ui::kv("filename", filename);
        ui::kv("label", &label);
    } else {
        println!("{label}");
    }

    Ok(())
}
