use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
};

/// Size of the ImageNet-1k vocabulary the classifier was trained on.
pub const IMAGENET_CLASS_COUNT: usize = 1000;

/// Loads the class vocabulary, one label per line, in vocabulary-index order.
pub fn load_imagenet_labels(filepath: &Path) -> io::Result<Vec<String>> {
    let file = File::open(filepath)?;
    let reader = io::BufReader::new(file);
    let mut labels = Vec::with_capacity(IMAGENET_CLASS_COUNT);

    for line_result in reader.lines() {
        let line = line_result?;
        let label = line.trim();

        if label.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("blank label at line {}", labels.len() + 1),
            ));
        }

        labels.push(label.to_string());
    }

    if labels.len() != IMAGENET_CLASS_COUNT {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "expected {} labels, found {}",
                IMAGENET_CLASS_COUNT,
                labels.len()
            ),
        ));
    }

    Ok(labels)
}
