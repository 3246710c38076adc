/// Arithmetic mean of comment ratings rounded to one decimal; 0 without comments.
pub fn average_rating(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let total: f64 = ratings.iter().map(|&r| f64::from(r)).sum();
    let mean = total / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}
