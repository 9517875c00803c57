// ###################################
// ->   Error format chain
// ###################################
/// Calls `Error::source()` on a chain of errors and tries to write them to a `Formatter`.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current_src = e.source();
    while let Some(cause) = current_src {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current_src = cause.source();
    }

    Ok(())
}
