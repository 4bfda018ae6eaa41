//! Blend mode listing.

use anyhow::Result;
use stackview_ops::BlendMode;

/// Prints the blend modes in menu order.
pub fn run(verbose: bool) -> Result<()> {
    for mode in BlendMode::ALL {
        if verbose {
            println!("{:<20} {}", mode.name(), mode.id());
        } else {
            println!("{}", mode.name());
        }
    }
    Ok(())
}
