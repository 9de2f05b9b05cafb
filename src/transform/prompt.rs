//! Static system instruction sent with every transform request.
//!
//! The instruction pins the model's role and the exact JSON schema of a
//! module record. It is configuration, not derived from input; a config file
//! may replace it wholesale (`model.system_instruction`).

/// Default system instruction.
pub const SYSTEM_INSTRUCTION: &str = r#"Sen "RA'VEN OS" isimli siber-medikal eğitim simülasyonunun baş içerik mimarısın.
Görevin, verilen ham tıbbi veriyi (ders notu, slayt metni) analiz edip sistemin işleyebileceği JSON formatına dönüştürmektir.

ÇIKTI SADECE VE SADECE JSON OLMALIDIR.

JSON ŞEMASI:
{
  "meta": { "title": "KONU BAŞLIĞI", "tag": "DERS ADI" },
  "modules": {
    "id": "benzersiz_id_ingilizce",
    "code": "AUTO-G",
    "title": "KONU BAŞLIĞI",
    "author": "RA'VEN AI",
    "tag": "DERS ADI",
    "class": "3",
    "block": "GENEL",
    "url": "modules/dosya_adi.json",
    "summary": { "text": "<div class='summary-container'><div class='sum-card sum-clinic'><div class='sum-title'>TERMİNAL VERİSİ</div><div class='sum-body'>...ÖNEMLİ BİLGİLER...</div></div></div>" },
    "cases": [
      { "id": "c1", "title": "GÖREV 1: ...", "desc": "...", "start": "s1", "scenes": { "s1": { "text": "...", "opts": [{"txt":"...", "type":"correct/wrong", "go/action":"..."}] } } }
    ],
    "quiz": [ { "q": "...", "a": ["..."], "correct": 0 } ],
    "match": [ { "A": "...", "B": "..." } ],
    "decypher": [ { "text": "...", "decoys": ["..."] } ]
  }
}
NOT: id kısmı dosya adıyla uyumlu olmalı.
"#;

/// Label preceding the file name in the user turn.
pub const FILENAME_LABEL: &str = "DOSYA ADI";

/// Label preceding the document text in the user turn.
pub const CONTENT_LABEL: &str = "İÇERİK";

/// The single user turn for one document: file name, blank line, full text.
///
/// No truncation happens here; oversized inputs are the provider's problem.
pub fn user_message(filename: &str, text: &str) -> String {
    format!("{FILENAME_LABEL}: {filename}\n\n{CONTENT_LABEL}:\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_layout() {
        assert_eq!(
            user_message("kalp.pdf", "Sistol\nDiyastol"),
            "DOSYA ADI: kalp.pdf\n\nİÇERİK:\nSistol\nDiyastol"
        );
    }

    #[test]
    fn instruction_demands_json_schema() {
        assert!(SYSTEM_INSTRUCTION.contains("\"meta\""));
        assert!(SYSTEM_INSTRUCTION.contains("\"modules\""));
        assert!(SYSTEM_INSTRUCTION.contains("\"decypher\""));
    }
}
