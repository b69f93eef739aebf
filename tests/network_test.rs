//! Remote play over in-memory streams and real sockets.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::net::{TcpListener, TcpStream};
use tsuro::{
    ClientMessage, ClientOutcome, Connection, GameServer, Player, Referee, RemotePlayer,
    ServerConfig, ServerMessage, StrategyKind,
};
use tsuro_core::{Color, Placement, PlacementMessage, Port, Rotation};

const LINE_LIMIT: usize = 64 * 1024;

fn remote_pair(name: &str, age: u32) -> (Box<dyn Player>, Connection<DuplexStream>) {
    remote_pair_with_timeout(name, age, Duration::from_secs(5))
}

fn remote_pair_with_timeout(
    name: &str,
    age: u32,
    move_timeout: Duration,
) -> (Box<dyn Player>, Connection<DuplexStream>) {
    let (server_side, client_side) = tokio::io::duplex(LINE_LIMIT);
    let player = RemotePlayer::new(
        name,
        age,
        Connection::new(server_side, LINE_LIMIT, format!("server/{name}")),
        move_timeout,
    );
    (Box::new(player), Connection::new(client_side, LINE_LIMIT, format!("client/{name}")))
}

#[tokio::test]
async fn test_remote_game_matches_local_game() {
    let names: Vec<String> = ["ann", "bo", "cy"].map(String::from).to_vec();

    let mut players = Vec::new();
    let mut clients = Vec::new();
    for (age, name) in names.iter().enumerate() {
        let (player, connection) = remote_pair(name, age as u32);
        players.push(player);
        let name = name.clone();
        clients.push(tokio::spawn(async move {
            tsuro::play(connection, &name, StrategyKind::Dumb).await
        }));
    }

    let mut referee = Referee::new(players).await.unwrap();
    while referee.run_turn().await.unwrap() {}
    let remote = referee.results().outcome();
    drop(referee);

    for client in clients {
        // A client may bail out on a forfeited move; the server sees that as a
        // closed stream.
        let _ = client.await.unwrap();
    }

    let local = tsuro::run_game(&names).await.unwrap();
    assert_eq!(remote, local);
}

#[tokio::test]
async fn test_disconnected_client_forfeits() {
    let (mut player, mut client) = remote_pair("gone", 0);

    player.receive_color(Color::White).await;
    let color: Option<ServerMessage> = client.receive().await.unwrap();
    assert_eq!(color, Some(ServerMessage::ReceiveColor { color: Color::White }));

    // The client reads the request, then hangs up.
    let reader = tokio::spawn(async move {
        let request: Option<ServerMessage> = client.receive().await.unwrap();
        assert!(matches!(request, Some(ServerMessage::AskForMove { .. })));
        drop(client);
    });

    let board = tsuro_core::Board::new();
    assert_eq!(player.next_move(&board, &[]).await, None);
    reader.await.unwrap();
}

#[tokio::test]
async fn test_silent_client_times_out() {
    let (mut player, mut client) = remote_pair_with_timeout("mute", 0, Duration::from_secs(1));
    player.receive_color(Color::White).await;
    let _: Option<ServerMessage> = client.receive().await.unwrap();

    let board = tsuro_core::Board::new();
    let started = tokio::time::Instant::now();
    assert_eq!(player.next_move(&board, &[]).await, None);
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(1), "{waited:?}");
    assert!(waited < Duration::from_secs(3), "{waited:?}");

    // The connection stayed open the whole time; the request is still waiting.
    let request: Option<ServerMessage> = client.receive().await.unwrap();
    assert!(matches!(request, Some(ServerMessage::AskForMove { .. })));
}

#[tokio::test]
async fn test_remote_move_is_decoded() {
    let (mut player, mut client) = remote_pair("ann", 0);
    player.receive_color(Color::White).await;
    let _: Option<ServerMessage> = client.receive().await.unwrap();

    let placement = Placement::initial(1, Rotation::Half, Color::White, 0, 0, Port::A).unwrap();
    let answer = placement.clone();
    let responder = tokio::spawn(async move {
        let _: Option<ServerMessage> = client.receive().await.unwrap();
        client
            .send(&ClientMessage::MoveRequest(PlacementMessage::from(answer)))
            .await
            .unwrap();
        client
    });

    let board = tsuro_core::Board::new();
    assert_eq!(player.next_move(&board, &[]).await, Some(placement));
    responder.await.unwrap();
}

type ServerTask = tokio::task::JoinHandle<anyhow::Result<tsuro::GameResults>>;

async fn start_server(join_timeout_secs: u64) -> (String, ServerTask) {
    let config = ServerConfig::from_toml(&format!(
        "join_timeout_secs = {join_timeout_secs}\n\
         move_timeout_secs = 5\n\
         handshake_timeout_secs = 2\n"
    ))
    .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let server = GameServer::new(config);
    (address, tokio::spawn(async move { server.serve(listener).await }))
}

#[tokio::test]
async fn test_tcp_game_with_three_clients() {
    let (address, server) = start_server(1).await;

    let mut clients = Vec::new();
    for name in ["ann", "bo", "cy"] {
        let address = address.clone();
        clients.push(tokio::spawn(async move {
            tsuro::connect(&address, name, StrategyKind::Second, LINE_LIMIT).await
        }));
    }

    let results = server.await.unwrap().unwrap();
    let outcome = results.outcome();
    let mut named: Vec<String> = outcome
        .losers
        .iter()
        .chain(outcome.winners.iter().flatten())
        .cloned()
        .collect();
    named.sort();
    assert_eq!(named, vec!["ann", "bo", "cy"]);

    for client in clients {
        if let Ok(Ok(ClientOutcome::Finished(seen))) = client.await {
            assert_eq!(seen, results);
        }
    }
}

#[tokio::test]
async fn test_bad_handshake_is_ejected() {
    let (address, server) = start_server(1).await;

    let mut raw = TcpStream::connect(&address).await.unwrap();
    let (read_half, mut write_half) = raw.split();
    let mut lines = BufReader::new(read_half).lines();

    let greeting = lines.next_line().await.unwrap().unwrap();
    assert!(greeting.contains("ASK_FOR_PLAYER_INFO"), "{greeting}");

    write_half.write_all(b"{\"type\":\"MOVE_ACCEPTED\"}\n").await.unwrap();
    let reply = lines.next_line().await.unwrap().unwrap();
    assert!(reply.contains("EJECTED"), "{reply}");

    // Nobody else joins, so the roster is too small to play.
    let err = server.await.unwrap().unwrap_err();
    assert!(err.to_string().contains("Invalid number of players 0"), "{err}");
}
