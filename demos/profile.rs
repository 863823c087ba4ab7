use anyhow::bail;
use warbler::Client;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    let Some(user) = client.user(1).await? else {
        bail!("no user exists with the given id");
    };

    println!("@{}", user.username().await?);
    println!("{:?}", user.location().await?);
    println!("{:?}", user.bio().await?);
    println!("{:#?}", user.stats().await?);

    for warble in user.warbles().await? {
        println!("- {}", warble.text().await?);
    }

    Ok(())
}
