use burn::{
    nn::{
        conv::{Conv3d, Conv3dConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        PaddingConfig3d,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ActionCnnConfig {
    pub num_classes: usize,
    pub frame_size: usize,
    pub depth: usize,
    pub channels: usize,
    #[config(default = 0.25)]
    pub conv_dropout: f64,
    #[config(default = 0.5)]
    pub dense_dropout: f64,
}

impl ActionCnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ActionCnnModel<B> {
        let conv1 = self.conv_block(self.channels, 32, [1, 1, 1], device);
        let conv2 = self.conv_block(32, 32, [2, 2, 2], device);
        let conv3 = self.conv_block(32, 64, [1, 1, 1], device);
        let conv4 = self.conv_block(64, 64, [2, 2, 2], device);

        // Two stride-2 stages: each halves depth/height/width,
        // rounding up (kernel 3, padding 1).
        let d = halved(halved(self.depth));
        let s = halved(halved(self.frame_size));
        let flattened = 64 * d * s * s;

        ActionCnnModel {
            conv1,
            conv2,
            conv3,
            conv4,
            fc1: LinearConfig::new(flattened, 512).init(device),
            fc2: LinearConfig::new(512, self.num_classes).init(device),
            conv_dropout: DropoutConfig::new(self.conv_dropout).init(),
            dense_dropout: DropoutConfig::new(self.dense_dropout).init(),
        }
    }

    fn conv_block<B: Backend>(
        &self,
        in_channels: usize,
        out_channels: usize,
        stride: [usize; 3],
        device: &B::Device,
    ) -> Conv3d<B> {
        Conv3dConfig::new([in_channels, out_channels], [3, 3, 3])
            .with_stride(stride)
            .with_padding(PaddingConfig3d::Explicit(1, 1, 1))
            .init(device)
    }
}

/// Output size of one stride-2, kernel-3, padding-1 convolution.
fn halved(size: usize) -> usize {
    (size - 1) / 2 + 1
}

#[derive(Module, Debug)]
pub struct ActionCnnModel<B: Backend> {
    pub conv1: Conv3d<B>,
    pub conv2: Conv3d<B>,
    pub conv3: Conv3d<B>,
    pub conv4: Conv3d<B>,
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
    pub conv_dropout: Dropout,
    pub dense_dropout: Dropout,
}

impl<B: Backend> ActionCnnModel<B> {
    /// clips: [batch, H, W, depth, C] → logits: [batch, num_classes]
    pub fn forward(&self, clips: Tensor<B, 5>) -> Tensor<B, 2> {
        use burn::tensor::activation::relu;

        // The conv stack wants NCDHW
        let x = clips.permute([0, 4, 3, 1, 2]);

        let x = relu(self.conv1.forward(x));
        let x = relu(self.conv2.forward(x));
        let x = self.conv_dropout.forward(x);
        let x = relu(self.conv3.forward(x));
        let x = relu(self.conv4.forward(x));
        let x = self.conv_dropout.forward(x);

        let [batch, c, d, h, w] = x.dims();
        let x = x.reshape([batch, c * d * h * w]);

        let x = relu(self.fc1.forward(x));
        let x = self.dense_dropout.forward(x);
        self.fc2.forward(x)
    }

    pub fn forward_loss(
        &self,
        clips: Tensor<B, 5>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>)
    where
        B: AutodiffBackend,
    {
        let logits = self.forward(clips);
        let loss = burn::nn::loss::CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_forward_produces_one_logit_row_per_clip() {
        let device = Default::default();
        let model: ActionCnnModel<TestBackend> =
            ActionCnnConfig::new(5, 16, 6, 1).init(&device);

        let clips = Tensor::<TestBackend, 5>::zeros([2, 16, 16, 6, 1], &device);
        let logits = model.forward(clips);
        assert_eq!(logits.dims(), [2, 5]);
    }

    #[test]
    fn test_halved_rounds_up() {
        assert_eq!(halved(32), 16);
        assert_eq!(halved(10), 5);
        assert_eq!(halved(5), 3);
        assert_eq!(halved(1), 1);
    }
}
