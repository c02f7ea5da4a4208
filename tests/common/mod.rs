#![allow(dead_code)]

use serde_json::{Value, json};
use timetable_solver::config::AppConfig;
use timetable_solver::data::SolveRequest;

pub const MATH: u32 = 10;
pub const SCIENCE: u32 = 11;
pub const ENGLISH: u32 = 12;
pub const RAJ: u32 = 100;
pub const DEVI: u32 = 101;
pub const ROOM: u32 = 200;
pub const LAB: u32 = 201;

pub fn full_week(key: &str, ids: &[u32]) -> Value {
    let mut rows = Vec::new();
    for &id in ids {
        for day in 0..5 {
            for period in 0..8 {
                let mut row = json!({"day": day, "period": period, "available": 1});
                row[key] = json!(id);
                rows.push(row);
            }
        }
    }
    Value::Array(rows)
}

/// Two classes, three subjects (science is a lab), two teachers, a plain
/// room and a lab, everyone available all week.
pub fn demo_request(demand: Value) -> Value {
    json!({
        "week_start": "2025-09-01",
        "strict": true,
        "classes": [{"id": 1, "code": "A", "section": "1"}, {"id": 2, "code": "B", "section": "1"}],
        "subjects": [
            {"id": MATH, "name": "Math", "is_lab": 0},
            {"id": SCIENCE, "name": "Science", "is_lab": 1},
            {"id": ENGLISH, "name": "English", "is_lab": 0}
        ],
        "teachers": [{"id": RAJ, "name": "Mr. Raj"}, {"id": DEVI, "name": "Mrs. Devi"}],
        "rooms": [{"id": ROOM, "name": "R1", "is_lab": 0}, {"id": LAB, "name": "Lab1", "is_lab": 1}],
        "teacher_subjects": [
            {"teacher_id": RAJ, "subject_id": MATH},
            {"teacher_id": RAJ, "subject_id": ENGLISH},
            {"teacher_id": DEVI, "subject_id": SCIENCE},
            {"teacher_id": DEVI, "subject_id": MATH},
            {"teacher_id": RAJ, "subject_id": SCIENCE}
        ],
        "availability_teacher": full_week("teacher_id", &[RAJ, DEVI]),
        "availability_room": full_week("room_id", &[ROOM, LAB]),
        "demand": demand,
        "locks": [],
        "penalties": {"room_mismatch": 4}
    })
}

pub fn demand(class_id: u32, subject_id: u32, periods_required: u32) -> Value {
    json!({"class_id": class_id, "subject_id": subject_id, "periods_required": periods_required})
}

pub fn lock(class_id: u32, day: u32, period: u32, subject_id: u32, teacher_id: u32, room_id: u32) -> Value {
    json!({
        "class_id": class_id, "day": day, "period": period,
        "subject_id": subject_id, "teacher_id": teacher_id, "room_id": room_id
    })
}

pub fn parse(value: Value) -> SolveRequest {
    serde_json::from_value(value).expect("valid request")
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.solver.time_limit_secs = 30.0;
    config.solver.workers = 2;
    config
}
