//! Choosing one renderer out of the discovered list.

use std::io::{BufRead, Write};

use crate::error::{DiscoveryError, Result};
use crate::RendererDescriptor;

/// Control endpoint of the renderer at `index`.
///
/// Pure lookup: never touches the network.
pub fn select(renderers: &[RendererDescriptor], index: usize) -> Result<String> {
    renderers
        .get(index)
        .map(RendererDescriptor::control_endpoint)
        .ok_or(DiscoveryError::InvalidSelection {
            index,
            available: renderers.len(),
        })
}

/// Print the renderer list and read one selection from `input`.
///
/// An empty line, `q` or end of input cancels. Input that is not a number
/// is an `UnrecognizedSelection`, a number outside the list an
/// `InvalidSelection`.
pub fn prompt_selection<R: BufRead, W: Write>(
    renderers: &[RendererDescriptor],
    mut input: R,
    mut output: W,
) -> Result<String> {
    let io_err = |e: std::io::Error| DiscoveryError::NetworkError(format!("Terminal I/O failed: {}", e));

    for (i, renderer) in renderers.iter().enumerate() {
        writeln!(output, "[{}] {} found at {}", i, renderer.friendly_name, renderer.base_url)
            .map_err(io_err)?;
    }
    write!(
        output,
        "Select by number (0-{}): ",
        renderers.len().saturating_sub(1)
    )
    .map_err(io_err)?;
    output.flush().map_err(io_err)?;

    let mut line = String::new();
    if input.read_line(&mut line).map_err(io_err)? == 0 {
        return Err(DiscoveryError::UserCancelled);
    }

    let answer = line.trim();
    if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
        return Err(DiscoveryError::UserCancelled);
    }

    let index = answer
        .parse::<usize>()
        .map_err(|_| DiscoveryError::UnrecognizedSelection {
            input: answer.to_string(),
            available: renderers.len(),
        })?;
    select(renderers, index)
}
