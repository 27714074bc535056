/// Hardware path the engine reports it was built to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accelerator {
    Npu,
    Gpu,
    SimdCpu,
    PlainCpu,
}

impl Accelerator {
    /// Classify an engine system-info string such as
    /// `"AVX = 1 | NEON = 0 | METAL = 1 | ..."`.
    ///
    /// Markers are matched case-sensitively as the engine prints them.
    /// whisper.cpp lists disabled features as `NAME = 0`, so only features
    /// reported as enabled count.
    pub fn from_system_info(info: &str) -> Self {
        let enabled = |marker: &str| {
            info.split('|').any(|field| {
                let field = field.trim();
                match field.split_once('=') {
                    Some((name, value)) => name.trim().contains(marker) && value.trim() != "0",
                    None => field.contains(marker),
                }
            })
        };

        if enabled("CANN") || enabled("NPU") {
            Accelerator::Npu
        } else if enabled("VULKAN") || enabled("GPU") || enabled("METAL") || enabled("CUDA") {
            Accelerator::Gpu
        } else if enabled("NEON") || enabled("AVX") {
            Accelerator::SimdCpu
        } else {
            Accelerator::PlainCpu
        }
    }
}

impl std::fmt::Display for Accelerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accelerator::Npu => write!(f, "NPU"),
            Accelerator::Gpu => write!(f, "GPU"),
            Accelerator::SimdCpu => write!(f, "CPU (SIMD)"),
            Accelerator::PlainCpu => write!(f, "CPU (no SIMD detected)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CANN = 1 | NEON = 1", Accelerator::Npu)]
    #[case("AVX = 1 | METAL = 1", Accelerator::Gpu)]
    #[case("VULKAN = 1", Accelerator::Gpu)]
    #[case("CUDA : ARCHS = 860 | AVX = 1", Accelerator::Gpu)]
    #[case("NEON = 1 | ARM_FMA = 1", Accelerator::SimdCpu)]
    #[case("AVX = 1 | AVX2 = 1 | METAL = 0", Accelerator::SimdCpu)]
    #[case("SSE3 = 1", Accelerator::PlainCpu)]
    #[case("", Accelerator::PlainCpu)]
    fn test_classifies_system_info(#[case] info: &str, #[case] expected: Accelerator) {
        assert_eq!(Accelerator::from_system_info(info), expected);
    }

    #[test]
    fn test_display_is_human_readable() {
        assert_eq!(Accelerator::Gpu.to_string(), "GPU");
        assert_eq!(Accelerator::SimdCpu.to_string(), "CPU (SIMD)");
    }
}
