use {
    serde::Serialize,
    switchboard_common::{Notification, Notifier},
};

/// Prints notifications on stderr so stdout stays machine-readable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Success(message) => eprintln!("ok: {message}"),
            Notification::Error(message) => eprintln!("error: {message}"),
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
