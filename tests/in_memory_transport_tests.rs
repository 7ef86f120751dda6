use broadside::{InMemoryTransport, Transport};

#[tokio::test(flavor = "multi_thread")]
async fn test_lines_arrive_in_order() -> anyhow::Result<()> {
    let (mut a, mut b) = InMemoryTransport::pair();
    a.send_line("HANDSHAKE;alice").await?;
    a.send_line("MOVE;A1").await?;
    b.send_line("HANDSHAKE").await?;

    assert_eq!(b.recv_line().await?.as_deref(), Some("HANDSHAKE;alice"));
    assert_eq!(b.recv_line().await?.as_deref(), Some("MOVE;A1"));
    assert_eq!(a.recv_line().await?.as_deref(), Some("HANDSHAKE"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_close_ends_the_peer_stream() -> anyhow::Result<()> {
    let (mut a, mut b) = InMemoryTransport::pair();
    a.send_line("EXIT").await?;
    a.close().await?;

    // queued lines are still delivered before the end of stream
    assert_eq!(b.recv_line().await?.as_deref(), Some("EXIT"));
    assert_eq!(b.recv_line().await?, None);
    assert!(a.send_line("MOVE;A1").await.is_err());
    assert!(b.send_line("MOVE;A1").await.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dropped_end_reads_as_closed() -> anyhow::Result<()> {
    let (a, mut b) = InMemoryTransport::pair();
    let waiter = tokio::spawn(async move { b.recv_line().await });
    drop(a);
    assert_eq!(waiter.await??, None);
    Ok(())
}
