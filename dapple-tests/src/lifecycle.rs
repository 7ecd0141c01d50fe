use dapple_core::{Connection, ConnectionAdapter, ConnectionState, Executor};

pub fn lifecycle<C: Connection + Executor>(adapter: &mut ConnectionAdapter<C>) {
    assert_eq!(adapter.state(), ConnectionState::Closed);
    adapter.open().expect("Failed to open the connection");
    assert_eq!(adapter.state(), ConnectionState::Open);

    // A second open is a no-op
    adapter.open().expect("Failed to open an already open connection");
    assert_eq!(adapter.state(), ConnectionState::Open);

    adapter.close().expect("Failed to close the connection");
    assert_eq!(adapter.state(), ConnectionState::Closed);

    let command = adapter.create_command();
    drop(command);
    assert_eq!(adapter.state(), ConnectionState::Closed);
}
