use anyhow::bail;
use warbler::Client;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let session = std::env::var("WARBLER_SESSION")?;
    let client = Client::with_session(&session);

    let mut timeline = client.timeline().await?;

    let mut heart = match timeline.entries().first() {
        Some(entry) => entry.heart(),
        None => bail!("timeline is empty; follow some users first"),
    };

    let state = heart.click(timeline.likes_mut()).await?;

    println!(
        "warble {} now renders `{}` and the counter reads {:?}",
        heart.warble().id(),
        state.css_class(),
        timeline.likes()
    );

    Ok(())
}
