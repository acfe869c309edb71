use std::fmt::Write as _;

use survey_core::model::Response;

/// Fixed column order of the results export.
pub const CSV_HEADER: &str =
    "rater,timestamp,image_id,filename,true_category,quality,guessed_category,correct,comment";

/// Serializes responses as CSV, one row per response in presentation
/// order, header first.
///
/// The free-text comment is the only field that can contain arbitrary
/// characters; it is always quoted with embedded quotes doubled.
#[must_use]
pub fn responses_to_csv(responses: &[Response]) -> String {
    let mut out = String::with_capacity(64 * (responses.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for response in responses {
        let comment = response.comment.replace('"', "\"\"");
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},\"{}\"",
            response.rater,
            response.rated_at.to_rfc3339(),
            response.trial_id,
            response.filename,
            response.true_category,
            response.quality,
            response.guessed_category,
            response.correct,
            comment,
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::model::{Category, ParticipantId, RatingDraft, Trial, TrialId};
    use survey_core::time::fixed_now;

    fn build_response(comment: &str) -> Response {
        let trial = Trial::new(TrialId::new(1), "image_001.jpg", Category::Original);
        let rating = RatingDraft {
            quality: Some(9),
            guessed_category: Some(Category::Denoised),
            comment: comment.to_string(),
        }
        .validate()
        .unwrap();
        Response::new(ParticipantId::parse("abc").unwrap(), &trial, rating, fixed_now())
    }

    #[test]
    fn header_comes_first() {
        let csv = responses_to_csv(&[]);
        assert_eq!(csv, format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn row_follows_the_fixed_column_order() {
        let csv = responses_to_csv(&[build_response("clean edges")]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            format!(
                "ABC,{},1,image_001.jpg,original,9,denoised,false,\"clean edges\"",
                fixed_now().to_rfc3339()
            )
        );
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let csv = responses_to_csv(&[build_response("ok \"great\"")]);
        assert!(csv.contains("\"ok \"\"great\"\"\""));
    }

    #[test]
    fn one_row_per_response() {
        let responses = vec![build_response("a"), build_response("b"), build_response("c")];
        let csv = responses_to_csv(&responses);
        assert_eq!(csv.lines().count(), 4);
    }
}
