mod device_client;
mod dispatch;
mod host;
mod poller;
mod store;
#[cfg(test)]
mod test_support;

// One cooperative event loop: polls, liveness checks and commands interleave
// only at await points.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
