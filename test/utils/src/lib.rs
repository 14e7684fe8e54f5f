#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

/// Body of a successful `/api/extract` call for a three slide lecture deck.
pub fn extraction_fixture() -> serde_json::Value {
    return serde_json::json!({
        "session_id": "sess-42",
        "slides": [
            {
                "page": 1,
                "title": "Kinematics",
                "text": "Displacement, velocity and acceleration describe motion."
            },
            {
                "page": 2,
                "title": "Newton's Laws",
                "text": "An object remains at rest unless acted on by a net force."
            },
            {
                "page": 3,
                "title": "",
                "text": "Energy is conserved in a closed system."
            }
        ]
    });
}

/// Stored slide payload as returned by the saved summaries endpoint.
pub fn saved_slides_fixture() -> serde_json::Value {
    return serde_json::json!([
        {
            "page": 1,
            "title": "Kinematics",
            "text": "Displacement, velocity and acceleration describe motion.",
            "bullets": ["Motion is described by displacement", "Velocity is the rate of change"]
        },
        {
            "page": 2,
            "title": "Newton's Laws",
            "text": "An object remains at rest unless acted on by a net force.",
            "bullets": ["Inertia keeps objects at rest"]
        }
    ]);
}
