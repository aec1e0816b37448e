//! Link poses pushed through the scene-graph interface.

use approx::assert_relative_eq;
use nalgebra::Vector3;

use pincer_linkage::LinkageModel;
use pincer_linkage::geometry::{LEFT_OUTER_KNUCKLE, RIGHT_INNER_KNUCKLE, RTQ85_LINKS};
use pincer_test_utils::RecordingSink;

#[test]
fn publishes_every_link_once() {
    let model = LinkageModel::new(40.0).unwrap();
    let mut sink = RecordingSink::new();
    model.publish(&mut sink);

    let names = sink.local_names();
    assert_eq!(names.len(), RTQ85_LINKS.len());
    for desc in RTQ85_LINKS {
        assert!(names.contains(&desc.name), "missing {}", desc.name);
    }
}

#[test]
fn published_poses_follow_jaw_width() {
    let mut model = LinkageModel::open().unwrap();
    let mut sink = RecordingSink::new();

    model.publish(&mut sink);
    let open = *sink.last_local(RIGHT_INNER_KNUCKLE).unwrap();

    model.set_jaw_width(0.0).unwrap();
    model.publish(&mut sink);
    let closed = *sink.last_local(RIGHT_INNER_KNUCKLE).unwrap();

    // Offset is fixed, only the rotation about +Z changes.
    assert_relative_eq!(open.translation.vector, closed.translation.vector);
    let delta = open.rotation.inverse() * closed.rotation;
    let angle = delta.angle().to_degrees();
    let expected = model.knuckle_angle() - pincer_linkage::knuckle_angle_for(85.0).unwrap();
    assert_relative_eq!(angle, expected.abs(), epsilon = 1e-2);
    let axis = delta.axis().unwrap();
    assert_relative_eq!(axis.into_inner().cross(&Vector3::z()).norm(), 0.0, epsilon = 1e-4);
}

#[test]
fn published_offsets_match_geometry_table() {
    let model = LinkageModel::open().unwrap();
    let mut sink = RecordingSink::new();
    model.publish(&mut sink);

    let pose = sink.last_local(LEFT_OUTER_KNUCKLE).unwrap();
    let desc = RTQ85_LINKS
        .iter()
        .find(|s| s.name == LEFT_OUTER_KNUCKLE)
        .unwrap();
    assert_relative_eq!(pose.translation.vector, Vector3::from(desc.offset));
}
