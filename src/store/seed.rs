use serde_json::{json, Value};

/// Document written when the data file does not exist yet.
pub fn default_document() -> Value {
    json!({
        "users": [],
        "departments": [
            {
                "id": 1,
                "name": "Cardiology",
                "description": "Diagnosis and treatment of heart and blood vessel conditions.",
                "icon": "fas fa-heartbeat"
            },
            {
                "id": 2,
                "name": "Dentistry",
                "description": "Preventive care, fillings, extractions and oral surgery.",
                "icon": "fas fa-tooth"
            },
            {
                "id": 3,
                "name": "Neurology",
                "description": "Care for disorders of the brain, spine and nervous system.",
                "icon": "fas fa-brain"
            },
            {
                "id": 4,
                "name": "Pediatrics",
                "description": "Medical care for infants, children and adolescents.",
                "icon": "fas fa-baby"
            },
            {
                "id": 5,
                "name": "Orthopedics",
                "description": "Treatment of bones, joints, ligaments and muscles.",
                "icon": "fas fa-bone"
            }
        ],
        "doctors": [
            {
                "id": 1,
                "name": "Dr. Smith",
                "role": "Cardiologist",
                "image": "/assets/img/doctor.svg"
            },
            {
                "id": 2,
                "name": "Dr. Johnson",
                "role": "Dentist",
                "image": "/assets/img/doctor.svg"
            },
            {
                "id": 3,
                "name": "Dr. Williams",
                "role": "Neurologist",
                "image": "/assets/img/doctor.svg"
            },
            {
                "id": 4,
                "name": "Dr. Brown",
                "role": "Pediatrician",
                "image": "/assets/img/doctor.svg"
            }
        ],
        "appointments": []
    })
}
