use directpv_node_exporter::collector::DEVICE_NOT_FOUND_REASON;
use directpv_node_exporter::k8s::events::{warning_event, EVENT_TYPE_WARNING};
use directpv_node_exporter::k8s::{Volume, VolumeStatus};

fn volume() -> Volume {
    Volume {
        name: "pvc-1234".to_string(),
        uid: Some("6a1c".to_string()),
        labels: Default::default(),
        status: VolumeStatus {
            fs_uuid: "3e8f-44aa".to_string(),
            node_name: "node-1".to_string(),
            total_capacity: 100,
            container_path: "/mnt".to_string(),
        },
    }
}

#[test]
fn test_warning_event_references_volume() {
    // Given: A volume whose device is missing
    let volume = volume();

    // When: Building the warning event
    let event = warning_event(
        &volume,
        DEVICE_NOT_FOUND_REASON,
        "unable to find device by FSUUID 3e8f-44aa".to_string(),
        "default",
        "node-1",
    );

    // Then: The event points at the volume custom resource
    let involved = &event.involved_object;
    assert_eq!(involved.api_version.as_deref(), Some("directpv.min.io/v1beta1"));
    assert_eq!(involved.kind.as_deref(), Some("DirectPVVolume"));
    assert_eq!(involved.name.as_deref(), Some("pvc-1234"));
    assert_eq!(involved.uid.as_deref(), Some("6a1c"));

    assert_eq!(event.type_.as_deref(), Some(EVENT_TYPE_WARNING));
    assert_eq!(event.reason.as_deref(), Some("NodeStageVolume"));
    assert!(event.message.as_deref().unwrap().contains("3e8f-44aa"));
    assert_eq!(event.metadata.namespace.as_deref(), Some("default"));
    assert_eq!(event.metadata.generate_name.as_deref(), Some("pvc-1234."));
    assert_eq!(event.count, Some(1));
}

#[test]
fn test_warning_event_source() {
    let event = warning_event(&volume(), "Reason", "message".to_string(), "directpv", "node-7");

    let source = event.source.expect("Event source missing");
    assert_eq!(source.component.as_deref(), Some("directpv"));
    assert_eq!(source.host.as_deref(), Some("node-7"));
    assert!(event.first_timestamp.is_some());
}
