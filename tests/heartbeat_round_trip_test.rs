use mtce_core::core::cluster::ClusterVault;
use mtce_core::core::heartbeat::{MissEvent, PulseAgent, PulseClient, PulseThresholds};

#[test]
fn agent_and_client_round_trip_clears_the_miss_counter() {
    let mut agent = PulseAgent::new("mgmt", 0, PulseThresholds::default());
    let mut client = PulseClient::new("compute-0");
    let vault = ClusterVault::new(100, true);

    agent.monitor("compute-0");

    // First period: no reply arrives in time.
    agent.begin_period();
    let misses = agent.close_period();
    assert_eq!(misses, vec![("compute-0".to_string(), MissEvent::Minor)]);

    // Second period: the client answers this time.
    let request = agent.begin_period();
    let reply = client
        .handle_request(&request, &vault)
        .expect("request addressed to the broadcast group must be answered");
    agent.handle_reply(&reply);

    let misses = agent.close_period();
    assert!(misses.is_empty(), "a timely reply must reset the miss streak");
    assert_eq!(agent.responding_count(), 1);
    assert_eq!(agent.not_responding_count(), 0);
}

#[test]
fn client_ignores_requests_addressed_to_a_different_host() {
    let mut agent = PulseAgent::new("mgmt", 0, PulseThresholds::default());
    let mut client = PulseClient::new("compute-1");
    let vault = ClusterVault::new(100, true);

    agent.monitor("compute-1");
    let mut request = agent.begin_period();
    request.hostname = "compute-0".to_string();

    assert!(client.handle_request(&request, &vault).is_none());
}
