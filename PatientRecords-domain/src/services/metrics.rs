use crate::entities::patient::Verdict;

/// Body mass index for a height in centimeters and weight in kilograms,
/// rounded to two decimals
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    round_to_hundredths(weight_kg / (height_m * height_m))
}

/// Categorize a BMI. Bands are checked in order and the first match wins;
/// values in [24.9, 25) match no band and fall through to Obesity.
pub fn categorize_bmi(bmi: f64) -> Verdict {
    if bmi < 18.5 {
        Verdict::Underweight
    } else if (18.5..24.9).contains(&bmi) {
        Verdict::NormalWeight
    } else if (25.0..29.9).contains(&bmi) {
        Verdict::Overweight
    } else {
        Verdict::Obesity
    }
}

/// BMI and verdict for a height/weight pair
pub fn derive_metrics(height_cm: f64, weight_kg: f64) -> (f64, Verdict) {
    let bmi = calculate_bmi(height_cm, weight_kg);
    (bmi, categorize_bmi(bmi))
}

/// Round on the exact binary value, ties to even. Scaling by 100 first
/// would introduce ties that the stored value does not have.
fn round_to_hundredths(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}
