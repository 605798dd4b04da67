use console::Term;
use eonet::CancelFlag;

/// Set up the Ctrl+C handler for a load run.
///
/// The first Ctrl+C cancels the run, which stops folding and reports what was
/// loaded so far. A second Ctrl+C exits immediately.
pub(crate) fn setup_shutdown_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            return;
        }

        let is_tty = Term::stdout().is_term();
        if is_tty {
            eprintln!("\n\nShutdown requested, keeping events loaded so far...");
            eprintln!("Press Ctrl+C again to force quit.");
        } else {
            tracing::warn!("Shutdown requested, cancelling load");
        }

        cancel.cancel();

        // Wait for second Ctrl+C for force quit
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }

        if is_tty {
            eprintln!("Force quit!");
        }
        std::process::exit(130);
    });
}
