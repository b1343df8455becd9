use std::io;
use std::thread;
use std::time::Duration;

use textme::{NotificationRequest, text_me_when_done};

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

/// Stand-in for a simulation or a training run.
fn very_long_process(max_number: u32, pause: Duration) -> Result<(), io::Error> {
    for i in 0..=max_number {
        thread::sleep(pause);
        println!("{i}");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let carrier = std::env::var("TEXTME_CARRIER").unwrap_or_else(|_| "AT&T".to_owned());
    let phone = required_env("TEXTME_PHONE")?;
    let sender = required_env("TEXTME_GMAIL_ADDRESS")?;
    let password = required_env("TEXTME_GMAIL_APP_PASSWORD")?;

    let request = NotificationRequest::new(carrier, phone, sender, password)?;
    let delivery = text_me_when_done(request, || {
        very_long_process(10, Duration::from_secs(1))
    })?;

    println!(
        "Successfully sent the SMS: {} to {}",
        delivery.subject,
        delivery.recipients.join(", ")
    );

    Ok(())
}
