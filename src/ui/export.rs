//! Spreadsheet-friendly export of the appointment listing: UTF-8 with BOM,
//! `sep=;` preamble so Excel picks the delimiter regardless of locale,
//! CRLF line endings.

use crate::normalize::Appointment;

const SEP: &str = ";";

const HEADER: [&str; 9] = [
    "appointmentId",
    "startAt",
    "endAt",
    "durationMinutes",
    "status",
    "patientId",
    "doctorId",
    "serviceId",
    "cabinetId",
];

fn csv_escape(value: &str) -> String {
    let needs_quotes = value.contains(['"', ',', ';', '\n', '\r']);
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn build_appointments_csv(rows: &[Appointment]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!("sep={SEP}"));
    lines.push(HEADER.join(SEP));

    for a in rows {
        let fields = [
            a.appointment_id.to_string(),
            a.start_at.clone(),
            a.end_at.clone().unwrap_or_default(),
            a.duration_minutes.to_string(),
            a.status.clone(),
            a.patient_id.to_string(),
            a.doctor_id.to_string(),
            a.service_id.to_string(),
            a.cabinet_id.to_string(),
        ];
        lines.push(
            fields
                .iter()
                .map(|f| csv_escape(f))
                .collect::<Vec<_>>()
                .join(SEP),
        );
    }

    format!("\u{feff}{}", lines.join("\r\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Appointment;

    fn sample(status: &str) -> Appointment {
        Appointment {
            appointment_id: 12,
            patient_id: 1,
            doctor_id: 2,
            service_id: 3,
            cabinet_id: 4,
            start_at: "2024-03-05T09:00:00Z".to_string(),
            end_at: Some("2024-03-05T09:30:00Z".to_string()),
            duration_minutes: 30,
            price: None,
            status: status.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn framing_is_bom_sep_header_crlf() {
        let csv = build_appointments_csv(&[sample("NEW")]);
        assert!(csv.starts_with('\u{feff}'));

        let body = csv.trim_start_matches('\u{feff}');
        let lines: Vec<&str> = body.split("\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "sep=;");
        assert_eq!(
            lines[1],
            "appointmentId;startAt;endAt;durationMinutes;status;patientId;doctorId;serviceId;cabinetId"
        );
        assert_eq!(
            lines[2],
            "12;2024-03-05T09:00:00Z;2024-03-05T09:30:00Z;30;NEW;1;2;3;4"
        );
    }

    #[test]
    fn embedded_delimiter_is_quoted() {
        let csv = build_appointments_csv(&[sample("WAITING; CALL BACK")]);
        assert!(csv.contains(";\"WAITING; CALL BACK\";"));
    }

    #[test]
    fn embedded_quote_is_doubled() {
        let csv = build_appointments_csv(&[sample(r#"SAID "NO""#)]);
        assert!(csv.contains(r#";"SAID ""NO""";"#));
    }

    #[test]
    fn missing_end_at_is_empty_field() {
        let mut a = sample("NEW");
        a.end_at = None;
        let csv = build_appointments_csv(&[a]);
        assert!(csv.contains("12;2024-03-05T09:00:00Z;;30;NEW"));
    }
}
