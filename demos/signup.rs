use warbler::Client;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let client = Client::new()
        .signup("warbler-demo", "demo@example.com", "password", None)
        .await?;

    client.post_warble("First warble!").await?;

    println!("signed up and posted; session valid: {}", client.has_valid_session().await?);

    Ok(())
}
