//! Question library: common questions a patient can add with one click.

use crate::labels::Locale;

const ENGLISH_QUESTIONS: &[&str] = &[
    "What is the diagnosis of my current condition?",
    "What is causing my condition?",
    "Do I need any further tests or examinations?",
    "What treatment options are available?",
    "What are the benefits and risks of each treatment option?",
    "What are the side effects of the prescribed medication?",
    "How long do I need to take this medication?",
    "Are there foods or activities I should avoid?",
    "What should I do if my symptoms get worse?",
    "When should I come back for a follow-up?",
    "Is this condition contagious?",
    "How can I prevent this condition from coming back?",
    "Are there lifestyle changes I should make?",
    "What can I do at home to help my recovery?",
    "Will this condition affect my daily activities?",
    "What warning signs should I watch out for?",
    "Do I need a referral to a specialist?",
    "How much will the treatment cost?",
    "Are there alternative treatments I could try?",
    "What is the prognosis or expected recovery for my condition?",
];

const INDONESIAN_QUESTIONS: &[&str] = &[
    "Apa diagnosis dari kondisi saya saat ini?",
    "Apa penyebab dari kondisi saya?",
    "Apakah ada tes atau pemeriksaan lebih lanjut yang saya perlukan?",
    "Apa saja pilihan pengobatan yang tersedia?",
    "Apa manfaat dan risiko dari setiap pilihan pengobatan?",
    "Apa efek samping dari obat yang diresepkan?",
    "Berapa lama saya harus minum obat ini?",
    "Apakah ada pantangan makanan atau aktivitas yang harus saya hindari?",
    "Apa yang harus saya lakukan jika gejala memburuk?",
    "Kapan saya harus kontrol kembali?",
    "Apakah kondisi ini menular?",
    "Bagaimana cara mencegah kondisi ini berulang?",
    "Apakah ada perubahan gaya hidup yang perlu saya lakukan?",
    "Apa yang bisa saya lakukan di rumah untuk membantu pemulihan?",
    "Apakah kondisi ini akan mempengaruhi aktivitas sehari-hari saya?",
    "Apa tanda-tanda bahaya yang harus saya waspadai?",
    "Apakah saya perlu rujukan ke dokter spesialis?",
    "Berapa biaya pengobatan yang diperlukan?",
    "Apakah ada pengobatan alternatif yang bisa saya coba?",
    "Bagaimana prognosis atau perkiraan kesembuhan kondisi saya?",
];

/// The library in the given language, in display order.
pub fn common_questions(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::English => ENGLISH_QUESTIONS,
        Locale::Indonesian => INDONESIAN_QUESTIONS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn libraries_have_twenty_questions() {
        assert_eq!(common_questions(Locale::English).len(), 20);
        assert_eq!(common_questions(Locale::Indonesian).len(), 20);
    }

    #[test]
    fn library_entries_are_unique_and_non_blank() {
        for locale in [Locale::English, Locale::Indonesian] {
            let questions = common_questions(locale);
            let unique: std::collections::HashSet<_> = questions.iter().collect();
            assert_eq!(unique.len(), questions.len());
            assert!(questions.iter().all(|q| !q.trim().is_empty()));
        }
    }
}
