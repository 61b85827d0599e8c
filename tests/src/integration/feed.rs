//! # Feed Flow
//!
//! Publishers configured through the node environment feed the node's
//! monitor; a late publisher is picked up by a retrying subscription.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use feed_subscriber::{subscribe, TopicFilter, RETRY_INTERVAL};
    use node_runtime::container::load_config_from;
    use node_runtime::FeedMonitor;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use tokio::sync::watch;
    use tokio::time::timeout;

    async fn publisher(lines: &'static [&'static str]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let host = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            for line in lines {
                socket.write_all(line.as_bytes()).await.unwrap();
                socket.write_all(b"\n").await.unwrap();
            }
        });
        host
    }

    #[tokio::test]
    async fn test_configured_hosts_feed_monitor() {
        let a = publisher(&["state 3 ff", "request_in a 0", "vmmsg x"]).await;
        let b = publisher(&["request_out b 1", "stateless"]).await;

        let hosts = format!("{a},{b}");
        let config = load_config_from(|key| match key {
            "CN_FEED_HOSTS" => Some(hosts.clone()),
            "CN_FEED_TOPICS" => Some("state,request_in,request_out".to_string()),
            _ => None,
        });
        assert_eq!(config.feed.hosts.len(), 2);

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let monitor = FeedMonitor::connect(&config.feed, shutdown_rx)
            .await
            .unwrap();
        let seen = timeout(Duration::from_secs(5), monitor.run())
            .await
            .expect("publishers never closed");

        // Topic matching is by prefix: "stateless" matches "state".
        assert_eq!(seen, 4);
    }

    #[tokio::test]
    async fn test_retrying_subscription_finds_late_publisher() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let host = listener.local_addr().unwrap().to_string();
        drop(listener);

        let late = host.clone();
        tokio::spawn(async move {
            tokio::time::sleep(RETRY_INTERVAL * 3).await;
            let listener = TcpListener::bind(&late).await.unwrap();
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"vmmsg deploy ok\n").await.unwrap();
        });

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut rx = timeout(
            Duration::from_secs(5),
            subscribe(&host, TopicFilter::new(["vmmsg"]), true, shutdown_rx),
        )
        .await
        .expect("publisher never appeared")
        .unwrap();

        let message = timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message, vec!["vmmsg", "deploy", "ok"]);
    }
}
