use warbler::Client;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let session = std::env::var("WARBLER_SESSION")?;
    let client = Client::with_session(&session);

    let timeline = client.timeline().await?;

    if let Some(likes) = timeline.likes() {
        println!("likes given so far: {likes}");
    }

    for entry in timeline.entries() {
        println!(
            "[{}] @{}: {}",
            entry.state().css_class(),
            entry.poster(),
            entry.text()
        );
    }

    Ok(())
}
